//! Functional core for the Kinde starter.
//!
//! Everything in here is pure: no HTTP framework, no I/O. The imperative
//! shell lives in `kinde_auth`.

pub mod auth;
pub mod serde;
