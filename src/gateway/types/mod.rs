//! Gateway types module
//!
//! ## Submodules
//! - [`dto`]: Request bodies and response views
//! - [`request`]: Body extractor answering in the response envelope
//! - [`response`]: Response envelope and error mapping

pub mod dto;
pub mod request;
pub mod response;

// Re-export commonly used types at module root
pub use dto::{AccountView, CancelResponse, CreateTransferRequest, TransferView};
pub use request::ApiJson;
pub use response::{ApiError, ApiResponse, ApiResult, ErrorDetail, created, ok};
