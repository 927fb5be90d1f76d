//! Password resolution for deployment targets
//!
//! Handles:
//! - Building the query profile from explicit parameters or a caller context
//! - Fetching decrypted candidates from a credential store
//! - Running the match engine and reporting the outcome

mod request;
mod resolver;

pub use request::{ResolveMode, ResolveRequest, KEY_INTERNAL, KEY_PASSWORD};
pub use resolver::{CredentialResolver, Resolution};
