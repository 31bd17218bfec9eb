use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::{Claims, Identity, TokenSubject};
use crate::config::SecurityConfig;

/// Single failure value for every way a session token can be rejected.
///
/// The gate never branches on the message; it exists for diagnostics only.
#[derive(Debug, Clone, thiserror::Error)]
#[error("credential rejected: {reason}")]
pub struct VerificationError {
    reason: String,
}

impl VerificationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("JWT secret not configured")]
    MissingSecret,
    #[error("token lifetime must be positive and representable, got {0}s")]
    InvalidTtl(u64),
    #[error("token expiry is out of range")]
    ExpiryOutOfRange,
    #[error("JWT generation error: {0}")]
    Generation(#[from] jsonwebtoken::errors::Error),
}

/// Turns an opaque bearer token into an [`Identity`].
///
/// Implementations must reject bad signatures, issuer or audience mismatches and
/// expired tokens, and must accept the token with or without a `Bearer ` prefix.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, VerificationError>;
}

/// HS256 signer and verifier for cartuner session tokens.
pub struct TokenAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl TokenAuthority {
    pub fn new(
        secret: &str,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        ttl: Duration,
    ) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let issuer = issuer.into();
        let audience = audience.into();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_audience(&[audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            issuer,
            audience,
            ttl,
        })
    }

    pub fn from_config(security: &SecurityConfig) -> Result<Self, TokenError> {
        let ttl = i64::try_from(security.token_ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .filter(|ttl| *ttl > Duration::zero())
            .ok_or(TokenError::InvalidTtl(security.token_ttl_secs))?;

        Self::new(
            &security.jwt_secret,
            security.jwt_issuer.clone(),
            security.jwt_audience.clone(),
            ttl,
        )
    }

    /// Sign a session token for `subject`, valid from now for the configured lifetime
    pub fn issue(&self, subject: &TokenSubject) -> Result<String, TokenError> {
        self.issue_at(subject, Utc::now())
    }

    /// Sign a session token as if it had been issued at `issued_at`
    pub fn issue_at(
        &self,
        subject: &TokenSubject,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or(TokenError::ExpiryOutOfRange)?;

        let claims = Claims {
            id: subject.id.clone(),
            role: subject.role,
            email: subject.email.clone(),
            name: subject.name.clone(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Validate signature, issuer, audience and expiry, then decode the identity
    pub fn decode(&self, token: &str) -> Result<Identity, VerificationError> {
        let token = strip_bearer(token);
        if token.is_empty() {
            return Err(VerificationError::new("empty token"));
        }

        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| VerificationError::new(e.to_string()))?;

        Identity::try_from(data.claims)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[async_trait]
impl CredentialVerifier for TokenAuthority {
    async fn verify(&self, token: &str) -> Result<Identity, VerificationError> {
        self.decode(token)
    }
}

/// Cookies written by the browser may carry the prefix URL-encoded
fn strip_bearer(token: &str) -> &str {
    let token = token.trim();
    token
        .strip_prefix("Bearer ")
        .or_else(|| token.strip_prefix("Bearer%20"))
        .unwrap_or(token)
        .trim()
}
