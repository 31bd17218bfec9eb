use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::server::AppState;

/// GET / - Service information and the active partition table
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    let table = state.gate.table();

    let protected: Vec<Value> = table
        .protected()
        .iter()
        .map(|rule| {
            json!({
                "prefix": rule.prefix,
                "role": rule.required_role,
                "auth_landing": rule.auth_landing,
            })
        })
        .collect();

    let landing: Vec<Value> = table
        .landing()
        .iter()
        .map(|rule| {
            json!({
                "prefix": rule.prefix,
                "role": rule.role,
                "dashboard": rule.dashboard,
            })
        })
        .collect();

    Json(json!({
        "success": true,
        "data": {
            "name": "Cartuner API",
            "version": env!("CARGO_PKG_VERSION"),
            "session_cookie": state.gate.cookie_name(),
            "partitions": {
                "protected": protected,
                "landing": landing,
            }
        }
    }))
}

/// GET /health - Liveness check
pub async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
        }
    }))
}
