mod error;
mod functions;
mod traits;
mod types;
mod validation;

pub use error::AuthError;
pub use functions::{
    calculate_expiry, compute_challenge, generate_code_verifier, generate_session_id,
    generate_state, generate_token, is_expired, CODE_VERIFIER_LENGTH, SESSION_ID_LENGTH,
    STATE_LENGTH,
};
pub use traits::{IdentityProvider, Result};
pub use types::{
    AccessToken, AuthorizationRequest, CallbackAction, CallbackParams, Prompt, Session,
    SessionState, SessionUser, UserProfile,
};
pub use validation::{validate_callback, validate_return_to};
