// Panel payload records
//
// One file per API area. Response records derive both serde directions so
// callers can re-serialize them; request records (`*Create`, `*Modify`)
// carry their own defaults and skip rules. Unknown response fields are
// ignored by serde's default behavior.

mod admin;
mod node;
mod proxy;
mod system;
mod user;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::{EntityKind, Schema};

pub use admin::{Admin, AdminCreate, AdminModify, Token};
pub use node::{
    DEFAULT_API_PORT, DEFAULT_NODE_PORT, Node, NodeCreate, NodeModify, NodeSettings, NodeStatus,
    NodeUsage, NodesUsage,
};
pub use proxy::{
    InboundPort, ProxyHost, ProxyHostAlpn, ProxyHostFingerprint, ProxyHostSecurity, ProxyInbound,
};
pub use system::{CoreStats, SystemStats};
pub use user::{
    DataLimitResetStrategy, SubscriptionUser, USERNAME_MAX_LEN, USERNAME_MIN_LEN, User,
    UserCreate, UserModify, UserStatus, UsersResponse,
};

/// Per-protocol proxy settings, e.g. `{"vless": {"flow": ""}}`.
///
/// Only the two outer levels are typed; the settings themselves stay opaque.
pub type ProxySettings = HashMap<String, Map<String, Value>>;

/// Inbound tags enabled per protocol, e.g. `{"vless": ["VLESS TCP"]}`.
pub type InboundSelection = HashMap<String, Vec<String>>;

/// The xray core configuration, kept as an open JSON object.
pub type CoreConfig = Map<String, Value>;

// ── Validation errors (HTTP 422) ─────────────────────────────────────

/// One server-side field validation failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Path to the offending field, e.g. `["body", "username"]`.
    pub loc: Vec<LocSegment>,
    pub msg: String,
    #[serde(rename = "type")]
    pub error_type: String,
}

/// A path segment inside `loc`: a field name or a list index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocSegment {
    Index(u64),
    Field(String),
}

impl std::fmt::Display for LocSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Field(name) => f.write_str(name),
        }
    }
}

impl std::fmt::Display for ValidationErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let loc: Vec<String> = self.loc.iter().map(ToString::to_string).collect();
        write!(f, "{}: {} ({})", loc.join("."), self.msg, self.error_type)
    }
}

/// Body of a 422 response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpValidationError {
    pub detail: Vec<ValidationErrorDetail>,
}

impl Schema for HttpValidationError {
    const KIND: EntityKind = EntityKind::HttpValidationError;
}

// ── serde helpers ────────────────────────────────────────────────────

/// Timestamps arrive either as RFC 3339 or as naive ISO-8601 (UTC implied).
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub(crate) fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp `{raw}`")))
    }

    pub(crate) fn deserialize_option<'de, D>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| {
                parse(&raw)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp `{raw}`")))
            })
            .transpose()
    }
}

/// Passwords and tokens stay in `SecretString`; these expose them only on
/// the wire.
pub(crate) mod secret {
    use secrecy::{ExposeSecret, SecretString};
    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S: Serializer>(
        value: &SecretString,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.expose_secret())
    }

    #[allow(clippy::ref_option)]
    pub(crate) fn serialize_option<S: Serializer>(
        value: &Option<SecretString>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(secret) => serializer.serialize_str(secret.expose_secret()),
            None => serializer.serialize_none(),
        }
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretString::from)
    }
}
