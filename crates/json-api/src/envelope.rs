//! Response envelope shared by every JSON route.

use salvo::{
    http::ResBody,
    oapi::ToSchema,
    prelude::*,
};
use serde::{Deserialize, Serialize};

/// `{success, data?, error?, message?}`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct Envelope<T: ToSchema + 'static> {
    /// Whether the request succeeded
    pub success: bool,

    /// Response payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Error category, on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Human-readable detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: ToSchema + 'static> Envelope<T> {
    pub(crate) fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        })
    }

    pub(crate) fn message(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data: None,
            error: None,
            message: Some(message.into()),
        })
    }
}

/// Placeholder payload for acknowledgement-only responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct NoData {}

/// Handler result carrying an enveloped payload.
pub(crate) type ApiResult<T> = Result<Json<Envelope<T>>, StatusError>;

/// Rewrites every error response into an [`Envelope`].
#[handler]
pub(crate) async fn envelope_errors(res: &mut Response, ctrl: &mut FlowCtrl) {
    let code = res.status_code.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if !(code.is_client_error() || code.is_server_error()) {
        return;
    }

    let (error, message) = match std::mem::replace(&mut res.body, ResBody::None) {
        ResBody::Error(status) => {
            let message = (!status.brief.is_empty()).then_some(status.brief);

            (status.name, message)
        }
        _ => (code.canonical_reason().unwrap_or("Error").to_string(), None),
    };

    res.status_code(code);
    res.render(Json(Envelope::<NoData> {
        success: false,
        data: None,
        error: Some(error),
        message,
    }));

    ctrl.skip_rest();
}
