pub mod request;
pub mod response;
pub mod router;

pub use request::{lambda_path, ApiRequest};
pub use response::{ApiResponse, ApiResult, ProxyResponse};
pub use router::{Dispatcher, Route};
