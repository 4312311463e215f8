// Proxy host and inbound records
//
// `security`, `alpn` and `fingerprint` are closed sets. An empty string is a
// legal member of the ALPN and fingerprint sets ("inherit from inbound");
// an absent or null field is `None`.

use serde::{Deserialize, Serialize};

use crate::schema::{EntityKind, Schema};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyHostSecurity {
    #[default]
    InboundDefault,
    None,
    Tls,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProxyHostAlpn {
    #[serde(rename = "http/1.1")]
    Http1,
    #[serde(rename = "h3")]
    H3,
    #[serde(rename = "h2")]
    H2,
    #[serde(rename = "h3,h2,http/1.1")]
    H3H2Http1,
    #[serde(rename = "h3,h2")]
    H3H2,
    #[serde(rename = "h2,http/1.1")]
    H2Http1,
    #[serde(rename = "")]
    Inherit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyHostFingerprint {
    Chrome,
    Firefox,
    Safari,
    Ios,
    Android,
    Edge,
    Qq,
    Random,
    Randomized,
    #[serde(rename = "")]
    Inherit,
}

/// A host entry of an inbound -- `GET /api/hosts`, grouped by inbound tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyHost {
    pub remark: String,
    pub address: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub sni: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub security: ProxyHostSecurity,
    #[serde(default)]
    pub alpn: Option<ProxyHostAlpn>,
    #[serde(default)]
    pub fingerprint: Option<ProxyHostFingerprint>,
    #[serde(default)]
    pub allowinsecure: Option<bool>,
    pub is_disabled: bool,
    pub mux_enable: bool,
    #[serde(default)]
    pub fragment_setting: Option<String>,
    #[serde(default)]
    pub noise_setting: Option<String>,
    pub random_user_agent: bool,
}

impl Schema for ProxyHost {
    const KIND: EntityKind = EntityKind::ProxyHost;
}

/// Inbound port: a number, or a range/list string such as `"2000-3000"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InboundPort {
    Number(u16),
    Spec(String),
}

/// An xray inbound -- `GET /api/inbounds`, grouped by protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyInbound {
    pub tag: String,
    pub protocol: String,
    pub network: String,
    pub tls: String,
    pub port: InboundPort,
}

impl Schema for ProxyInbound {
    const KIND: EntityKind = EntityKind::ProxyInbound;
}
