pub mod client;
pub mod config;
pub mod contact;
pub mod dispatch;
pub mod error;
pub mod gate;
pub mod integration;
pub mod io;
pub mod local;
pub mod lock;
pub mod paths;
pub mod report;
pub mod resolver;
pub mod types;

pub use error::{ContactClientError, Result};
