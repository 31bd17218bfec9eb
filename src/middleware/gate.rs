use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use super::partition::{PartitionOutcome, PartitionTable};
use crate::auth::{CredentialVerifier, Identity};

/// Why a protected request was sent back to its sign-in page.
///
/// Only used for diagnostics; every kind produces the same redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GateRejection {
    #[error("no session credential")]
    MissingCredential,
    #[error("session credential failed verification")]
    InvalidCredential,
    #[error("session role does not own this partition")]
    RoleMismatch,
    #[error("credential verifier faulted")]
    VerifierFault,
}

/// Outcome of gating a single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Pass through. Carries the identity when the path was protected.
    Allow(Option<Identity>),
    RedirectToAuth { target: String, reason: GateRejection },
    RedirectToDashboard(String),
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow(_))
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Decision::Allow(_) => None,
            Decision::RedirectToAuth { target, .. } => Some(target),
            Decision::RedirectToDashboard(target) => Some(target),
        }
    }
}

/// The route authorization gate: partition table plus credential verifier.
///
/// Immutable once built and shared across requests behind an `Arc`.
pub struct RouteGate {
    table: PartitionTable,
    verifier: Arc<dyn CredentialVerifier>,
    cookie_name: String,
}

impl RouteGate {
    pub fn new(
        table: PartitionTable,
        verifier: Arc<dyn CredentialVerifier>,
        cookie_name: impl Into<String>,
    ) -> Self {
        Self {
            table,
            verifier,
            cookie_name: cookie_name.into(),
        }
    }

    pub fn table(&self) -> &PartitionTable {
        &self.table
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Decide what happens to a request for `path` carrying `credential`.
    ///
    /// The verifier is consulted at most once, and only when the path is gated
    /// and a credential is present.
    pub async fn decide(&self, path: &str, credential: Option<&str>) -> Decision {
        match self.table.resolve(path) {
            PartitionOutcome::Unrestricted => Decision::Allow(None),

            PartitionOutcome::Protected {
                required_role,
                auth_landing,
            } => {
                let redirect = |reason: GateRejection| {
                    tracing::debug!(path, %reason, landing = auth_landing, "redirecting to sign-in");
                    Decision::RedirectToAuth {
                        target: auth_landing.to_string(),
                        reason,
                    }
                };

                let Some(token) = credential else {
                    return redirect(GateRejection::MissingCredential);
                };

                match self.verify(token).await {
                    Err(reason) => redirect(reason),
                    Ok(identity) if identity.role == required_role => {
                        tracing::debug!(path, role = %identity.role, "session admitted");
                        Decision::Allow(Some(identity))
                    }
                    Ok(identity) => {
                        tracing::debug!(path, role = %identity.role, required = %required_role, "role mismatch");
                        redirect(GateRejection::RoleMismatch)
                    }
                }
            }

            PartitionOutcome::AuthLanding { role, dashboard } => {
                let Some(token) = credential else {
                    return Decision::Allow(None);
                };

                // A stale cookie must never block the sign-in page
                match self.verify(token).await {
                    Ok(identity) if identity.role == role => {
                        tracing::debug!(path, role = %role, dashboard, "already signed in");
                        Decision::RedirectToDashboard(dashboard.to_string())
                    }
                    _ => Decision::Allow(None),
                }
            }
        }
    }

    /// Run the verifier, folding panics into a rejection so the gate fails closed
    async fn verify(&self, token: &str) -> Result<Identity, GateRejection> {
        match AssertUnwindSafe(self.verifier.verify(token)).catch_unwind().await {
            Ok(Ok(identity)) => Ok(identity),
            Ok(Err(e)) => {
                tracing::debug!("{}", e);
                Err(GateRejection::InvalidCredential)
            }
            Err(_) => {
                tracing::error!("credential verifier panicked; treating credential as invalid");
                Err(GateRejection::VerifierFault)
            }
        }
    }
}
