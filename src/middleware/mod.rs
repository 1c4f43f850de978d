pub mod gate;
pub mod response;

pub use gate::access_gate_middleware;
pub use response::{ApiResponse, ApiResult};
