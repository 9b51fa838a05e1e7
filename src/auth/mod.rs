//! Wallet-signature authentication.
//!
//! Challenge-response protocol: the server issues a single-use nonce per
//! address, the wallet signs it off-system, and the server recovers the
//! signer from the signature before minting a time-limited JWT session.

pub mod error;
pub mod middleware;
pub mod nonce;
pub mod service;
pub mod session;
pub mod signature;

pub use error::{AuthError, AuthErrorCode};
pub use middleware::require_auth;
pub use nonce::{CHALLENGE_PREFIX, NonceStore};
pub use service::AuthService;
pub use session::{Claims, SessionIssuer};
pub use signature::{is_valid_address, normalize_address, recover_signer};
