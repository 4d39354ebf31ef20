//! Parlo core — bus types, configuration, OpenAI wire types, and utilities.

pub mod bus;
pub mod config;
pub mod types;
pub mod utils;
