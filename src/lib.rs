mod api;
pub mod args;
pub mod commands;
mod config;
mod error;
mod ledger;
pub mod model;
mod server;
mod utils;

pub use api::Mode;
pub use config::{Config, CorsPolicy, CredentialSource};
pub use error::{Error, ErrorType, Result};
pub use ledger::Ledger;
pub use server::build_router;
