use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use super::cookie::extract_credential;
use super::gate::{Decision, RouteGate};
use super::identity::{attach_identity, strip_identity};

/// Route authorization middleware applied in front of every route.
///
/// Reads the session cookie, asks the [`RouteGate`] for a decision, and either
/// forwards the request (with the caller's identity attached on protected
/// routes) or answers with a `307` redirect. Authentication failures never
/// surface as error pages.
pub async fn route_gate_middleware(
    State(gate): State<Arc<RouteGate>>,
    mut request: Request,
    next: Next,
) -> Response {
    strip_identity(&mut request);

    let path = request.uri().path().to_owned();
    let credential = extract_credential(request.headers(), gate.cookie_name());

    match gate.decide(&path, credential.as_deref()).await {
        Decision::Allow(Some(identity)) => {
            attach_identity(&mut request, identity);
            next.run(request).await
        }
        Decision::Allow(None) => next.run(request).await,
        Decision::RedirectToAuth { target, .. } | Decision::RedirectToDashboard(target) => {
            redirect(&target, request.uri().query())
        }
    }
}

/// Redirect to `target`, carrying over the original query string
fn redirect(target: &str, query: Option<&str>) -> Response {
    match query.filter(|q| !q.is_empty()) {
        Some(query) => Redirect::temporary(&format!("{target}?{query}")).into_response(),
        None => Redirect::temporary(target).into_response(),
    }
}
