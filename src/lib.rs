pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod news;
pub mod risk;
pub mod services;
pub mod solana;
pub mod utils;
pub mod validation;

pub use error::{Error, Result};
