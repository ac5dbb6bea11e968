//! Auth-domain primitives: request signing, redacted token secrets, and credentials.

pub mod credential;
pub mod secret;
pub mod signer;

pub use credential::*;
pub use secret::*;
pub use signer::*;
