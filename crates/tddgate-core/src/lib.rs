pub mod candidates;
pub mod classifier;
pub mod config;
pub mod error;
pub mod gate;
pub mod io;
pub mod log;
pub mod paths;
pub mod request;
pub mod types;

pub use error::{GuardError, Result};
