pub mod config;
pub mod logging;

pub mod error;
pub mod fetch;
pub mod filename;
pub mod output;
pub mod pipeline;
pub mod print;
pub mod token_store;
