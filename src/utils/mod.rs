// Utility functions
pub mod error;
pub mod html;
pub mod ids;
pub mod validation;

pub use error::*;
