mod app;
pub mod json;
