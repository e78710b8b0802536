//! Handle construction and error translation shared by every gateway.

pub mod classify;
pub mod config;
pub mod credentials;
pub mod handle;

pub use classify::Classify;
pub use config::{ConnectionParams, ConstructionPath};
pub use credentials::{CredentialResolver, DefaultChainResolver, StaticResolver};
pub use handle::{Gateway, connect, connect_with};
