use axum::http::Uri;
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, CurrentIdentity};

/// GET /screens/{client,mechanic,owner,admin}/dashboard, /screens/client/orders
///
/// Returns the caller's identity as decoded by the gate; the page content is
/// rendered client-side from it.
pub async fn screen(CurrentIdentity(identity): CurrentIdentity, uri: Uri) -> ApiResponse<Value> {
    tracing::debug!(id = %identity.id, role = %identity.role, path = uri.path(), "serving screen");

    ApiResponse::success(json!({
        "screen": uri.path(),
        "home": identity.role.dashboard_path(),
        "identity": identity,
    }))
}
