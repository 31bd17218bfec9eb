// handlers/mod.rs - Two-tier handler layout
//
// Public (no session needed) → Protected (admitted by the route gate)
//
// Both tiers sit behind the same route gate middleware; the partition table,
// not the router, decides which paths need a session.
pub mod public;    // Tier 1: service info, sign-in landing pages
pub mod protected; // Tier 2: role dashboards under /screens/*

use crate::error::ApiError;

/// Fallback for unknown paths. Runs after the gate, so unknown paths inside a
/// protected partition still redirect anonymous callers first.
pub async fn not_found(uri: axum::http::Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}
