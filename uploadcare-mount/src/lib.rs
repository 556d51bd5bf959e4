pub mod api_client;
pub mod cache_file;
pub mod cli;
pub mod job_queue;
pub mod load_config;

pub use cli::{run, Cli, Commands};
