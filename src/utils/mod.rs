pub mod error;
pub mod logger;
pub mod style;
pub mod validation;
