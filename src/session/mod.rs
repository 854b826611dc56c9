//! ChatKit session proxy
//!
//! Turns an inbound session request into one upstream session-issuance call
//! and folds every upstream outcome into a `SessionResult`:
//! - upstream 200 with `client_secret` → `{client_secret, origin}`
//! - upstream non-200 → `{error, status_code}`
//! - 200 without `client_secret` → `{error, openai_response}`
//! - unparsable body → `{error, raw_response}`
//! - transport failure → `{error}`

mod origin;
mod proxy;
mod types;

pub use origin::resolve_origin;
pub use proxy::{build_payload, create_session};
pub use types::{SessionFailure, SessionRequest, SessionResult};
