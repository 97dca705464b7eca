use super::reviews::{ReviewContext, product_context};
use super::state::{SubmitOutcome, THINKING_PLACEHOLDER, WidgetPhase, WidgetView, classify_response};
use super::transport::AskTransport;
use crate::error::WidgetError;
use crate::proxy::AskRequest;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const TIMEOUT_MESSAGE: &str = "Error: Request timed out";
pub const CANCELLED_MESSAGE: &str = "Error: Request cancelled";

/// Ask-a-question widget, independent of any renderer.
///
/// State is published through a `watch` channel; renderers call
/// [`AskWidget::subscribe`] and redraw on every change.
pub struct AskWidget<T: AskTransport> {
    transport: T,
    product_context: String,
    reviews: ReviewContext,
    timeout: Duration,
    view: watch::Sender<WidgetView>,
    /// Generation and cancel handle of the submission in flight.
    in_flight: Mutex<Option<(u64, CancellationToken)>>,
    generation: AtomicU64,
}

impl<T: AskTransport> AskWidget<T> {
    pub fn new(transport: T) -> Self {
        let (view, _) = watch::channel(WidgetView::default());
        Self {
            transport,
            product_context: String::new(),
            reviews: ReviewContext::default(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            view,
            in_flight: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_product_context(mut self, context: impl Into<String>) -> Self {
        self.product_context = context.into();
        self
    }

    pub fn with_reviews(mut self, reviews: ReviewContext) -> Self {
        self.reviews = reviews;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<WidgetView> {
        self.view.subscribe()
    }

    pub fn view(&self) -> WidgetView {
        self.view.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.view.borrow().phase == WidgetPhase::Loading
    }

    /// Mirror the text field. Does not change the phase.
    pub fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        self.view.send_if_modified(|view| {
            if view.query == query {
                false
            } else {
                view.query = query;
                true
            }
        });
    }

    /// Send `query` and drive the widget to a terminal phase.
    pub async fn submit(&self, query: &str) -> SubmitOutcome {
        let question = query.trim();
        if question.is_empty() {
            return SubmitOutcome::Ignored;
        }

        let (generation, token) = {
            let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.is_some() {
                tracing::debug!("submission rejected: request already in flight");
                return SubmitOutcome::Busy;
            }
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            let token = CancellationToken::new();
            *slot = Some((generation, token.clone()));
            // Published under the lock so a concurrent `clear` always wins.
            self.view.send_modify(|view| {
                view.phase = WidgetPhase::Loading;
                view.query = query.to_string();
                view.input_enabled = false;
                view.focus_requested = false;
                view.error_class = false;
                view.loading_class = true;
                view.response_visible = true;
                view.response_text = Some(THINKING_PLACEHOLDER.to_string());
            });
            (generation, token)
        };

        let request = AskRequest {
            question: question.to_string(),
            product_context: product_context(&self.product_context, &self.reviews),
        };

        let result = tokio::select! {
            () = token.cancelled() => Err(CANCELLED_MESSAGE.to_string()),
            sent = tokio::time::timeout(self.timeout, self.transport.post_question(&request)) => {
                match sent {
                    Err(_) | Ok(Err(WidgetError::Timeout)) => Err(TIMEOUT_MESSAGE.to_string()),
                    Ok(Err(WidgetError::Network(message) | WidgetError::InvalidSelector(message))) => {
                        Err(format!("Error: {message}"))
                    }
                    Ok(Ok(response)) => classify_response(&response),
                }
            }
        };

        {
            let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.as_ref().map(|(g, _)| *g) != Some(generation) {
                return SubmitOutcome::Superseded;
            }
            *slot = None;
        }

        match result {
            Ok(answer) => {
                self.finish(WidgetPhase::Success, answer.clone());
                SubmitOutcome::Answered(answer)
            }
            Err(message) => {
                tracing::debug!(error = %message, "widget request failed");
                self.finish(WidgetPhase::Error, message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }

    fn finish(&self, phase: WidgetPhase, text: String) {
        self.view.send_modify(|view| {
            view.phase = phase;
            view.input_enabled = true;
            view.focus_requested = true;
            view.loading_class = false;
            view.error_class = phase == WidgetPhase::Error;
            view.response_visible = true;
            view.response_text = Some(text);
            view.attribution_visible = true;
        });
    }

    /// Abort the in-flight submission; it finishes with a cancelled error.
    pub fn cancel(&self) {
        let slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((_, token)) = slot.as_ref() {
            token.cancel();
        }
    }

    /// Back to `Idle`. An in-flight submission is cancelled and its result dropped.
    pub fn clear(&self) {
        let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((_, token)) = slot.take() {
            token.cancel();
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.view.send_replace(WidgetView::default());
    }
}
