//! Product Categories Handler

use salvo::prelude::*;

use emporium_app::domain::products::records::Category;

use crate::envelope::{ApiResult, Envelope};

/// Product Categories Handler
///
/// Returns the fixed set of catalog categories.
#[endpoint(
    tags("products"),
    summary = "List Product Categories",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler() -> ApiResult<Vec<String>> {
    Ok(Envelope::ok(
        Category::ALL.iter().map(ToString::to_string).collect(),
    ))
}
