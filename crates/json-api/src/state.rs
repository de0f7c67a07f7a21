//! State

use std::sync::Arc;

use emporium_app::{context::AppContext, payments::webhook::WebhookVerifier};

#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,
    pub(crate) webhook: WebhookVerifier,
}

impl State {
    #[must_use]
    pub(crate) fn new(app: AppContext, webhook: WebhookVerifier) -> Self {
        Self { app, webhook }
    }

    #[must_use]
    pub(crate) fn shared(app: AppContext, webhook: WebhookVerifier) -> Arc<Self> {
        Arc::new(Self::new(app, webhook))
    }
}
