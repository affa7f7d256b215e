pub mod auth;
pub mod response;

pub use auth::{authenticate_jwt, ensure_logged_in, extract_token, AuthGate};
pub use response::{ApiResponse, ApiResult};
