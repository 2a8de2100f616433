//! Merchant API keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::ids::ApiKeyId;

/// Maximum length of an API key name.
pub const MAX_KEY_NAME_LEN: usize = 100;

/// Characters kept at the front of a masked key.
const MASK_PREFIX_LEN: usize = 12;

/// Characters kept at the end of a masked key.
const MASK_SUFFIX_LEN: usize = 4;

/// A capability granted to an API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Read orders.
    Read,
    /// Create orders.
    Write,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "read",
            Self::Write => "write",
        })
    }
}

/// Whether a key may still be used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStatus {
    /// Usable.
    #[default]
    Active,
    /// Disabled by an operator.
    Revoked,
}

/// An opaque credential record for merchant programmatic access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    /// The key itself; also its identifier.
    pub key_id: ApiKeyId,

    /// Human-readable label.
    pub name: String,

    /// Active or revoked.
    pub status: KeyStatus,

    /// Granted capabilities.
    pub permissions: BTreeSet<Permission>,

    /// Last successful authentication with this key.
    pub last_used: Option<DateTime<Utc>>,

    /// When the key was created.
    pub created_at: DateTime<Utc>,
}

impl ApiKey {
    /// Create a new active key.
    ///
    /// An empty permission set falls back to `{read}`.
    #[must_use]
    pub fn new(name: String, permissions: BTreeSet<Permission>, now: DateTime<Utc>) -> Self {
        let permissions = if permissions.is_empty() {
            default_permissions()
        } else {
            permissions
        };
        Self {
            key_id: ApiKeyId::generate(),
            name,
            status: KeyStatus::Active,
            permissions,
            last_used: None,
            created_at: now,
        }
    }

    /// Whether the key is active and grants `permission`.
    #[must_use]
    pub fn allows(&self, permission: Permission) -> bool {
        self.status == KeyStatus::Active && self.permissions.contains(&permission)
    }

    /// The key masked for display.
    #[must_use]
    pub fn masked(&self) -> String {
        mask_key(self.key_id.as_str(), false)
    }
}

/// Permissions granted when none are requested.
#[must_use]
pub fn default_permissions() -> BTreeSet<Permission> {
    BTreeSet::from([Permission::Read])
}

/// Mask a key for display.
///
/// Keys longer than 16 characters keep their first 12 and last 4 characters
/// around `...`. Shorter keys show only `****` plus the last 4. When
/// `revealed` is set the key is returned unchanged.
#[must_use]
pub fn mask_key(key: &str, revealed: bool) -> String {
    if revealed {
        return key.to_string();
    }
    let chars: Vec<char> = key.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(MASK_SUFFIX_LEN)..]
        .iter()
        .collect();
    if chars.len() <= MASK_PREFIX_LEN + MASK_SUFFIX_LEN {
        return format!("****{tail}");
    }
    let head: String = chars[..MASK_PREFIX_LEN].iter().collect();
    format!("{head}...{tail}")
}
