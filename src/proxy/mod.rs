//! Answering storefront questions through an OpenAI-compatible endpoint.

pub mod http_client;
pub mod openai_compat;
pub mod prompt;
pub mod service;
pub mod traits;
pub mod types;

pub use openai_compat::OpenAiCompatibleProvider;
pub use service::{AskError, AskService};
pub use traits::Provider;
pub use types::{AskRequest, AskResponse, ErrorResponse};
