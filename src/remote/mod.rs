//! Move providers: where the CPU's replies come from.

mod client;
mod error;
mod provider;

pub use client::RemoteProvider;
pub use error::ProviderError;
pub use provider::{LocalProvider, MoveProvider};
