//! Parent trace context extraction from HTTP headers.

use opentelemetry::{Context, global, propagation::Extractor, trace::TraceContextExt as _};
use salvo::http::{HeaderMap, HeaderName};

/// A remote span context carried in on `traceparent`.
#[derive(Debug)]
pub(super) struct ParentContext(pub(super) Context);

impl ParentContext {
    /// Extract a valid remote parent, if the caller sent one.
    pub(super) fn extract(headers: &HeaderMap) -> Option<Self> {
        global::get_text_map_propagator(|propagator| {
            // A fresh base keeps a missing header from inheriting the active span.
            let context = propagator.extract_with_context(&Context::new(), &Headers(headers));

            let valid = context.span().span_context().is_valid();

            valid.then_some(Self(context))
        })
    }
}

#[derive(Debug)]
struct Headers<'a>(&'a HeaderMap);

impl Extractor for Headers<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(HeaderName::as_str).collect()
    }
}
