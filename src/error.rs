use std::fmt::Display;

use crate::simulation::GeometryError;

#[derive(Debug)]
pub enum Error {
    Geometry(GeometryError),
    Init(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Geometry(e) => write!(f, "Geometry error: {e}"),
            Error::Init(reason) => write!(f, "Init error: {reason}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Geometry(e) => Some(e),
            Error::Init(_) => None,
        }
    }
}

impl From<GeometryError> for Error {
    fn from(val: GeometryError) -> Self {
        Error::Geometry(val)
    }
}

impl From<String> for Error {
    fn from(val: String) -> Self {
        Error::Init(val)
    }
}
