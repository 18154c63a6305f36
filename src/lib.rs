#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![deny(warnings)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the grantrs application
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod codec;
pub mod device;
pub mod errors;
pub mod gate;
pub mod handlers;
pub mod models;
pub mod session;
pub mod settings;
pub mod store;

/// Re-export commonly used items
pub use codec::CredentialCodec;
pub use errors::AuthError;
pub use gate::AuthenticatedAccount;
pub use session::SessionManager;
pub use settings::GrantrsSettings;
pub use store::{MemoryStore, SessionStore, SqliteStore};
