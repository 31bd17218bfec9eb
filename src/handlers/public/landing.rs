use axum::{extract::State, http::Uri};
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, PartitionOutcome};
use crate::server::AppState;

/// GET /auth/{client,mechanic,admin}/signin, /auth/admin, /auth/signin
///
/// Placeholder for the sign-in form. Reaching this handler means the caller has
/// no session for the page's role; the form itself is rendered by the web app.
pub async fn signin_page(State(state): State<AppState>, uri: Uri) -> ApiResponse<Value> {
    let role = match state.gate.table().resolve(uri.path()) {
        PartitionOutcome::AuthLanding { role, .. } => Some(role),
        _ => None,
    };

    ApiResponse::success(json!({
        "page": "signin",
        "path": uri.path(),
        "role": role,
    }))
}
