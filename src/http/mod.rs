//! HTTP API server
//!
//! - POST /api/chatkit/session - Create a ChatKit session (always 200)
//! - POST /api/transcribe - Transcribe an uploaded audio file
//! - GET /api/health - Health check
//! - GET /{path} - Static bundle with SPA fallback

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
