//! HTTP API for the folio configuration store

pub mod error;
pub mod server;

pub use error::{ApiError, ApiResult};
pub use server::{ApiServer, OWNER_HEADER, OwnerId};
