//! REST API over the services.
//!
//! Every successful response is wrapped as `{"data": ..., "meta": {"timestamp": ...}}`
//! and every error as `{"detail": {"error": {"code": ..., "message": ...}}}`.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod response;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use extract::{ApiJson, ApiPath, ApiQuery, CurrentUser};
pub use response::{ApiResponse, ApiResult, Meta};
pub use router::{build_router, HttpServer};
pub use state::AppState;
