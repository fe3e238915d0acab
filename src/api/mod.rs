pub mod client;
pub mod endpoint;
pub mod error;

pub use client::{ApiResponse, PatientApiClient, SUBSCRIPTION_KEY_HEADER};
pub use endpoint::Endpoint;
pub use error::ClientError;
