pub mod client;
pub mod config;
pub mod parse;
pub mod sample;
pub mod schema;
pub mod server;

#[cfg(test)]
mod test_support;

pub use client::{FetchError, StatsClient};
pub use config::Config;
pub use parse::DisplayRow;
