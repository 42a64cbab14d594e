pub mod auth;
pub mod buildinfo;
pub mod cli;
pub mod config;
pub mod constants;
pub mod engine;
pub mod platform;
pub mod reference;
pub mod registry;
pub mod resolve;
pub mod transport;

pub use anyhow::Result;
