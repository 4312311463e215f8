// User records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Admin, InboundSelection, ProxySettings, timestamp};
use crate::schema::{EntityKind, FullPayload, PartialPayload, Schema};

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    #[default]
    Active,
    Disabled,
    Limited,
    Expired,
    OnHold,
}

/// How often `used_traffic` is reset against `data_limit`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataLimitResetStrategy {
    #[default]
    NoReset,
    Day,
    Week,
    Month,
    Year,
}

fn check_username(username: &str) -> Result<(), String> {
    let len = username.chars().count();
    if (USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        Ok(())
    } else {
        Err(format!(
            "username must be {USERNAME_MIN_LEN}-{USERNAME_MAX_LEN} characters, got {len}"
        ))
    }
}

/// A user as returned by the user endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub proxies: ProxySettings,
    #[serde(default)]
    pub expire: Option<i64>,
    #[serde(default)]
    pub data_limit: Option<u64>,
    pub data_limit_reset_strategy: DataLimitResetStrategy,
    #[serde(default)]
    pub inbounds: InboundSelection,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub sub_updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sub_last_user_agent: Option<String>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub online_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub on_hold_expire_duration: Option<i64>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub on_hold_timeout: Option<DateTime<Utc>>,
    #[serde(default)]
    pub auto_delete_in_days: Option<i64>,
    pub status: UserStatus,
    pub used_traffic: u64,
    #[serde(default)]
    pub lifetime_used_traffic: Option<u64>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub subscription_url: Option<String>,
    #[serde(default)]
    pub excluded_inbounds: InboundSelection,
    /// Snapshot of the owning admin, not a live reference.
    #[serde(default)]
    pub admin: Option<Admin>,
}

impl Schema for User {
    const KIND: EntityKind = EntityKind::User;

    fn check(&self) -> Result<(), String> {
        check_username(&self.username)
    }
}

/// Envelope of `GET /api/users`.
///
/// `get_users` walks the `users` list itself so a bad element is reported
/// with its index; this record is the whole-envelope shape for `validate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
    #[serde(default)]
    pub total: Option<u64>,
}

impl Schema for UsersResponse {
    const KIND: EntityKind = EntityKind::Users;

    fn check(&self) -> Result<(), String> {
        self.users.iter().try_for_each(User::check)
    }
}

/// What `GET /sub/{token}/` exposes about its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionUser {
    pub username: String,
    pub status: UserStatus,
    pub used_traffic: u64,
    pub proxies: ProxySettings,
    #[serde(default)]
    pub expire: Option<i64>,
    #[serde(default)]
    pub data_limit: Option<u64>,
    pub data_limit_reset_strategy: DataLimitResetStrategy,
    #[serde(default)]
    pub inbounds: InboundSelection,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub subscription_url: Option<String>,
    #[serde(default)]
    pub excluded_inbounds: InboundSelection,
    #[serde(default)]
    pub admin: Option<Admin>,
}

impl Schema for SubscriptionUser {
    const KIND: EntityKind = EntityKind::SubscriptionUser;
}

/// Body of `POST /api/user`. Every field is sent; unset optionals as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserCreate {
    pub username: String,
    pub proxies: ProxySettings,
    pub expire: Option<i64>,
    pub data_limit: Option<u64>,
    pub data_limit_reset_strategy: DataLimitResetStrategy,
    pub inbounds: InboundSelection,
    pub note: Option<String>,
    pub sub_updated_at: Option<DateTime<Utc>>,
    pub sub_last_user_agent: Option<String>,
    pub online_at: Option<DateTime<Utc>>,
    pub on_hold_expire_duration: Option<i64>,
    pub on_hold_timeout: Option<DateTime<Utc>>,
    pub auto_delete_in_days: Option<i64>,
    pub status: UserStatus,
}

impl UserCreate {
    /// An active user with no limits, no expiry and the panel's default
    /// inbounds.
    pub fn new(username: impl Into<String>, proxies: ProxySettings) -> Self {
        Self {
            username: username.into(),
            proxies,
            expire: None,
            data_limit: None,
            data_limit_reset_strategy: DataLimitResetStrategy::NoReset,
            inbounds: InboundSelection::new(),
            note: None,
            sub_updated_at: None,
            sub_last_user_agent: None,
            online_at: None,
            on_hold_expire_duration: None,
            on_hold_timeout: None,
            auto_delete_in_days: None,
            status: UserStatus::Active,
        }
    }
}

impl Schema for UserCreate {
    const KIND: EntityKind = EntityKind::UserCreate;

    fn check(&self) -> Result<(), String> {
        check_username(&self.username)
    }
}

impl FullPayload for UserCreate {}

/// Body of `PUT /api/user/{username}`. Only set fields are sent, so the
/// panel keeps its current value for everything left as `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserModify {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxies: Option<ProxySettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_limit_reset_strategy: Option<DataLimitResetStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inbounds: Option<InboundSelection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_last_user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub online_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_hold_expire_duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_hold_timeout: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_delete_in_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
}

impl Schema for UserModify {
    const KIND: EntityKind = EntityKind::UserModify;
}

impl PartialPayload for UserModify {}
