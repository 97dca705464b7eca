//! Storefront "Ask Me Anything" widget: request state machine, transport to
//! the app proxy and optional review-snippet enrichment.

pub mod machine;
pub mod reviews;
pub mod state;
pub mod transport;

pub use machine::{AskWidget, CANCELLED_MESSAGE, DEFAULT_REQUEST_TIMEOUT, TIMEOUT_MESSAGE};
pub use reviews::{DEFAULT_REVIEW_SELECTORS, ReviewContext, product_context};
pub use state::{SubmitOutcome, THINKING_PLACEHOLDER, WidgetPhase, WidgetView, classify_response};
pub use transport::{AskTransport, DEFAULT_PROXY_PATH, HttpAskTransport, TransportResponse};
