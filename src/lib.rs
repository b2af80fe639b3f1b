pub mod aggregate;
pub mod args;
mod backup;
pub mod calendar;
pub mod commands;
mod config;
mod db;
mod error;
pub mod model;
pub mod store;
mod utils;

#[cfg(test)]
mod test;

pub use backup::Backup;
pub use config::Config;
pub use error::Error;
pub use error::Result;
