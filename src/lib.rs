pub mod cli;
pub mod config;
pub mod context;
pub mod crypto;
pub mod error;
pub mod generate;
pub mod models;
pub mod output;
pub mod prompt;
pub mod rules;
pub mod storage;
pub mod templates;
pub mod utils;

pub use error::{Error, Result};
