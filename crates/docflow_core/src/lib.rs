pub mod error;
pub mod models;
pub mod workflow;

pub use error::{Error, Result};
