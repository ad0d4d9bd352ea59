mod collision;
mod diagnostics;
mod entity;
mod intersection;
mod physics;
mod response;
mod shape;
mod stepper;
mod terrain;
mod vector;

pub use collision::*;
pub use diagnostics::*;
pub use entity::*;
pub use intersection::*;
pub use physics::*;
pub use response::*;
pub use shape::*;
pub use stepper::*;
pub use terrain::*;
pub use vector::*;
