use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::auth::Role;

/// A route partition that only sessions of `required_role` may enter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionRule {
    pub prefix: String,
    #[serde(rename = "role")]
    pub required_role: Role,
    /// Where unauthenticated or wrong-role requests are sent
    pub auth_landing: String,
}

impl PartitionRule {
    pub fn new(prefix: impl Into<String>, required_role: Role, auth_landing: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            required_role,
            auth_landing: auth_landing.into(),
        }
    }
}

/// A sign-in style page that sends already-authenticated sessions of `role`
/// to `dashboard` instead of rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandingRule {
    pub prefix: String,
    pub role: Role,
    pub dashboard: String,
}

impl LandingRule {
    pub fn new(prefix: impl Into<String>, role: Role, dashboard: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            role,
            dashboard: dashboard.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionOutcome<'a> {
    Protected {
        required_role: Role,
        auth_landing: &'a str,
    },
    AuthLanding {
        role: Role,
        dashboard: &'a str,
    },
    Unrestricted,
}

#[derive(Debug, thiserror::Error)]
pub enum PartitionError {
    #[error("'{0}' is not an absolute path")]
    InvalidPath(String),
    #[error("prefixes '{0}' and '{1}' overlap")]
    OverlappingPrefixes(String, String),
    #[error("redirect target '{target}' of '{prefix}' lands back inside a gated partition")]
    RedirectLoop { prefix: String, target: String },
    #[error("failed to read partition table: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse partition table: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// On-disk shape of a partition table
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct PartitionFile {
    #[serde(default)]
    protected: Vec<PartitionRule>,
    #[serde(default)]
    landing: Vec<LandingRule>,
}

/// Static mapping from path prefixes to the role that owns them.
///
/// Built once at start-up. Construction rejects overlapping prefixes, so every
/// path resolves to at most one protected rule and at most one landing rule,
/// and never to both.
#[derive(Debug, Clone)]
pub struct PartitionTable {
    protected: Vec<PartitionRule>,
    landing: Vec<LandingRule>,
}

impl PartitionTable {
    pub fn new(protected: Vec<PartitionRule>, landing: Vec<LandingRule>) -> Result<Self, PartitionError> {
        let protected = protected
            .into_iter()
            .map(|rule| -> Result<PartitionRule, PartitionError> {
                Ok(PartitionRule {
                    prefix: normalize(&rule.prefix)?,
                    auth_landing: normalize(&rule.auth_landing)?,
                    ..rule
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let landing = landing
            .into_iter()
            .map(|rule| -> Result<LandingRule, PartitionError> {
                Ok(LandingRule {
                    prefix: normalize(&rule.prefix)?,
                    dashboard: normalize(&rule.dashboard)?,
                    ..rule
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let prefixes: Vec<&str> = protected
            .iter()
            .map(|r| r.prefix.as_str())
            .chain(landing.iter().map(|r| r.prefix.as_str()))
            .collect();

        for (i, a) in prefixes.iter().enumerate() {
            for b in &prefixes[i + 1..] {
                if covers(a, b) || covers(b, a) {
                    return Err(PartitionError::OverlappingPrefixes(a.to_string(), b.to_string()));
                }
            }
        }

        let table = Self { protected, landing };

        for rule in &table.protected {
            if matches!(table.resolve(&rule.auth_landing), PartitionOutcome::Protected { .. }) {
                return Err(PartitionError::RedirectLoop {
                    prefix: rule.prefix.clone(),
                    target: rule.auth_landing.clone(),
                });
            }
        }
        for rule in &table.landing {
            if matches!(table.resolve(&rule.dashboard), PartitionOutcome::AuthLanding { .. }) {
                return Err(PartitionError::RedirectLoop {
                    prefix: rule.prefix.clone(),
                    target: rule.dashboard.clone(),
                });
            }
        }

        Ok(table)
    }

    /// The cartuner marketplace partitions: one dashboard tree per role.
    pub fn cartuner() -> Self {
        let protected = vec![
            PartitionRule::new("/screens/client", Role::Customer, Role::Customer.signin_path()),
            PartitionRule::new("/screens/mechanic", Role::Mechanic, Role::Mechanic.signin_path()),
            PartitionRule::new("/screens/owner", Role::StoreOwner, Role::StoreOwner.signin_path()),
            PartitionRule::new("/screens/admin", Role::Admin, Role::Admin.signin_path()),
        ];
        let landing = vec![
            LandingRule::new("/auth/client", Role::Customer, Role::Customer.dashboard_path()),
            LandingRule::new("/auth/mechanic", Role::Mechanic, Role::Mechanic.dashboard_path()),
            LandingRule::new("/auth/admin", Role::Admin, Role::Admin.dashboard_path()),
        ];

        Self { protected, landing }
    }

    pub fn from_yaml_str(source: &str) -> Result<Self, PartitionError> {
        let file: PartitionFile = serde_yaml::from_str(source)?;
        Self::new(file.protected, file.landing)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, PartitionError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&source)
    }

    /// Classify a request path. Longest matching prefix wins.
    pub fn resolve(&self, path: &str) -> PartitionOutcome<'_> {
        if let Some(rule) = self
            .protected
            .iter()
            .filter(|rule| covers(&rule.prefix, path))
            .max_by_key(|rule| rule.prefix.len())
        {
            return PartitionOutcome::Protected {
                required_role: rule.required_role,
                auth_landing: &rule.auth_landing,
            };
        }

        if let Some(rule) = self
            .landing
            .iter()
            .filter(|rule| covers(&rule.prefix, path))
            .max_by_key(|rule| rule.prefix.len())
        {
            return PartitionOutcome::AuthLanding {
                role: rule.role,
                dashboard: &rule.dashboard,
            };
        }

        PartitionOutcome::Unrestricted
    }

    pub fn protected(&self) -> &[PartitionRule] {
        &self.protected
    }

    pub fn landing(&self) -> &[LandingRule] {
        &self.landing
    }
}

fn normalize(path: &str) -> Result<String, PartitionError> {
    let path = path.trim();
    if !path.starts_with('/') {
        return Err(PartitionError::InvalidPath(path.to_string()));
    }
    let trimmed = path.trim_end_matches('/');
    Ok(if trimmed.is_empty() { "/".to_string() } else { trimmed.to_string() })
}

/// Prefix match on segment boundaries: `/screens/client` covers
/// `/screens/client/dashboard` but not `/screens/clientele`.
fn covers(prefix: &str, path: &str) -> bool {
    if prefix == "/" {
        return path.starts_with('/');
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
