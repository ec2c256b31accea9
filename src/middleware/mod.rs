pub mod response;
pub mod session;

pub use response::{ApiResponse, ApiResult};
pub use session::authenticate;
