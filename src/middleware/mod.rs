pub mod api_key;
pub mod deletion_guard;
pub mod response;

pub use api_key::api_key_middleware;
pub use deletion_guard::{deletion_guard_middleware, DeletionConflict};
pub use response::{ApiResponse, ApiResult};
