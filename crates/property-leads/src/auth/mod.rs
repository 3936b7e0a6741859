//! Agent login and session token verification.

pub mod error;
pub mod password;
pub mod router;
pub mod service;
pub mod token;

pub use error::AuthError;
pub use router::auth_router;
pub use service::{AuthService, LoginOutput, LoginRequest, VerifiedAgent};
pub use token::{SessionClaims, TokenSigner};
