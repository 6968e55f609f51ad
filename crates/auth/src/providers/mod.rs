//! Identity provider implementations.
//!
//! - Kinde (authorization URL, token exchange, userinfo)
//! - Mock (scriptable, for tests and local development)

mod kinde;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use kinde::KindeProvider;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockProvider;
