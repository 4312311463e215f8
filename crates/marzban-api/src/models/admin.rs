// Admin and token records

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::secret;
use crate::schema::{EntityKind, FullPayload, PartialPayload, Schema};

/// Bearer token issued by `POST /api/admin/token`.
#[derive(Debug, Clone, Deserialize)]
pub struct Token {
    #[serde(deserialize_with = "secret::deserialize")]
    pub access_token: SecretString,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_owned()
}

impl Schema for Token {
    const KIND: EntityKind = EntityKind::Token;

    fn check(&self) -> Result<(), String> {
        if self.access_token.expose_secret().is_empty() {
            return Err("access_token is empty".into());
        }
        Ok(())
    }
}

/// A panel administrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    pub username: String,
    pub is_sudo: bool,
    #[serde(default)]
    pub telegram_id: Option<i64>,
    #[serde(default)]
    pub discord_webhook: Option<String>,
}

impl Schema for Admin {
    const KIND: EntityKind = EntityKind::Admin;
}

/// Body of `POST /api/admin`.
#[derive(Debug, Clone, Serialize)]
pub struct AdminCreate {
    pub username: String,
    pub is_sudo: bool,
    #[serde(serialize_with = "secret::serialize")]
    pub password: SecretString,
    pub telegram_id: Option<i64>,
    pub discord_webhook: Option<String>,
}

impl AdminCreate {
    pub fn new(username: impl Into<String>, is_sudo: bool, password: SecretString) -> Self {
        Self {
            username: username.into(),
            is_sudo,
            password,
            telegram_id: None,
            discord_webhook: None,
        }
    }
}

impl Schema for AdminCreate {
    const KIND: EntityKind = EntityKind::AdminCreate;

    fn check(&self) -> Result<(), String> {
        if self.username.is_empty() {
            return Err("username is empty".into());
        }
        Ok(())
    }
}

impl FullPayload for AdminCreate {}

/// Body of `PUT /api/admin/{username}`.
///
/// `is_sudo` is always sent; the remaining fields only when set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AdminModify {
    pub is_sudo: bool,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "secret::serialize_option"
    )]
    pub password: Option<SecretString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discord_webhook: Option<String>,
}

impl Schema for AdminModify {
    const KIND: EntityKind = EntityKind::AdminModify;
}

impl PartialPayload for AdminModify {}
