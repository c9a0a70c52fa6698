pub mod candidates;
pub mod check;
pub mod classify;
pub mod config;
pub mod hook;
pub mod log;
