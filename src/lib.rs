pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod metrics;
pub mod observer;
pub mod output;
pub mod releases;
pub mod ui;

pub use error::{FourKeysError, Result};
