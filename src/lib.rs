pub mod config;
pub mod error;
pub mod queries;
pub mod tasks;
pub mod types;
pub mod utils;

#[cfg(test)]
mod testing;
