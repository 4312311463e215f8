// Schema registry
//
// Every payload shape the panel exchanges is a record in `crate::models`
// implementing `Schema`. Responses go through `parse` (serde structure plus
// the record's own `check`), requests through `serialize_full` or
// `serialize_partial`. Which of the two a request type uses is fixed by the
// `FullPayload` / `PartialPayload` marker it implements.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{
    Admin, CoreConfig, CoreStats, HttpValidationError, Node, NodeSettings, NodesUsage, ProxyHost,
    ProxyInbound, SubscriptionUser, SystemStats, Token, User, UsersResponse,
};

/// Every payload shape known to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Token,
    Admin,
    AdminCreate,
    AdminModify,
    Node,
    NodeCreate,
    NodeModify,
    NodeSettings,
    NodesUsage,
    ProxyHost,
    ProxyInbound,
    User,
    Users,
    UserCreate,
    UserModify,
    SubscriptionUser,
    SystemStats,
    CoreStats,
    CoreConfig,
    HttpValidationError,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::Admin => "admin",
            Self::AdminCreate => "admin create",
            Self::AdminModify => "admin modify",
            Self::Node => "node",
            Self::NodeCreate => "node create",
            Self::NodeModify => "node modify",
            Self::NodeSettings => "node settings",
            Self::NodesUsage => "nodes usage",
            Self::ProxyHost => "proxy host",
            Self::ProxyInbound => "proxy inbound",
            Self::User => "user",
            Self::Users => "users",
            Self::UserCreate => "user create",
            Self::UserModify => "user modify",
            Self::SubscriptionUser => "subscription user",
            Self::SystemStats => "system stats",
            Self::CoreStats => "core stats",
            Self::CoreConfig => "core config",
            Self::HttpValidationError => "validation error",
        }
    }

    /// `true` for shapes that only ever travel client -> panel.
    pub fn is_request(self) -> bool {
        matches!(
            self,
            Self::AdminCreate
                | Self::AdminModify
                | Self::NodeCreate
                | Self::NodeModify
                | Self::UserCreate
                | Self::UserModify
        )
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payload that did not match its shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} payload{}: {message}", location_suffix(.location))]
pub struct SchemaError {
    pub kind: EntityKind,
    /// Where inside a list or group the failure sits, e.g. `vless[2]`.
    /// Empty for the top level.
    pub location: String,
    pub message: String,
}

fn location_suffix(location: &str) -> String {
    if location.is_empty() {
        String::new()
    } else {
        format!(" at {location}")
    }
}

impl SchemaError {
    pub fn new(kind: EntityKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            location: String::new(),
            message: message.into(),
        }
    }

    fn within(mut self, prefix: &str) -> Self {
        self.location = format!("{prefix}{}", self.location);
        self
    }
}

/// A record with a known shape.
pub trait Schema {
    const KIND: EntityKind;

    /// Constraints serde cannot express (lengths, non-negative floats, ...).
    fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Request records sent whole, defaults included.
pub trait FullPayload: Schema + Serialize {}

/// Request records sent with only the fields the caller set.
pub trait PartialPayload: Schema + Serialize {}

/// Any validated record, tagged by kind.
#[derive(Debug, Clone)]
pub enum Entity {
    Token(Token),
    Admin(Admin),
    Node(Node),
    NodeSettings(NodeSettings),
    NodesUsage(NodesUsage),
    ProxyHost(Box<ProxyHost>),
    ProxyInbound(ProxyInbound),
    User(Box<User>),
    Users(UsersResponse),
    SubscriptionUser(Box<SubscriptionUser>),
    SystemStats(SystemStats),
    CoreStats(CoreStats),
    CoreConfig(CoreConfig),
    HttpValidationError(HttpValidationError),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Token(_) => EntityKind::Token,
            Self::Admin(_) => EntityKind::Admin,
            Self::Node(_) => EntityKind::Node,
            Self::NodeSettings(_) => EntityKind::NodeSettings,
            Self::NodesUsage(_) => EntityKind::NodesUsage,
            Self::ProxyHost(_) => EntityKind::ProxyHost,
            Self::ProxyInbound(_) => EntityKind::ProxyInbound,
            Self::User(_) => EntityKind::User,
            Self::Users(_) => EntityKind::Users,
            Self::SubscriptionUser(_) => EntityKind::SubscriptionUser,
            Self::SystemStats(_) => EntityKind::SystemStats,
            Self::CoreStats(_) => EntityKind::CoreStats,
            Self::CoreConfig(_) => EntityKind::CoreConfig,
            Self::HttpValidationError(_) => EntityKind::HttpValidationError,
        }
    }
}

// ── Validation ───────────────────────────────────────────────────────

/// Validate an untyped response payload against `kind`.
///
/// Missing required fields, wrong primitive types, values outside a closed
/// enumeration and failed record checks are all rejected. Unknown fields
/// are ignored.
pub fn validate(raw: Value, kind: EntityKind) -> Result<Entity, SchemaError> {
    let entity = match kind {
        EntityKind::Token => Entity::Token(parse(raw)?),
        EntityKind::Admin => Entity::Admin(parse(raw)?),
        EntityKind::Node => Entity::Node(parse(raw)?),
        EntityKind::NodeSettings => Entity::NodeSettings(parse(raw)?),
        EntityKind::NodesUsage => Entity::NodesUsage(parse(raw)?),
        EntityKind::ProxyHost => Entity::ProxyHost(Box::new(parse(raw)?)),
        EntityKind::ProxyInbound => Entity::ProxyInbound(parse(raw)?),
        EntityKind::User => Entity::User(Box::new(parse(raw)?)),
        EntityKind::Users => Entity::Users(parse(raw)?),
        EntityKind::SubscriptionUser => Entity::SubscriptionUser(Box::new(parse(raw)?)),
        EntityKind::SystemStats => Entity::SystemStats(parse(raw)?),
        EntityKind::CoreStats => Entity::CoreStats(parse(raw)?),
        EntityKind::CoreConfig => Entity::CoreConfig(parse_object(kind, raw)?),
        EntityKind::HttpValidationError => Entity::HttpValidationError(parse(raw)?),
        EntityKind::AdminCreate
        | EntityKind::AdminModify
        | EntityKind::NodeCreate
        | EntityKind::NodeModify
        | EntityKind::UserCreate
        | EntityKind::UserModify => {
            return Err(SchemaError::new(
                kind,
                "request shapes are serialized, not validated from responses",
            ));
        }
    };
    Ok(entity)
}

/// Typed form of [`validate`].
pub fn parse<T: Schema + DeserializeOwned>(raw: Value) -> Result<T, SchemaError> {
    let record: T =
        serde_json::from_value(raw).map_err(|e| SchemaError::new(T::KIND, e.to_string()))?;
    record.check().map_err(|m| SchemaError::new(T::KIND, m))?;
    Ok(record)
}

/// Validate a JSON array element by element.
pub fn parse_list<T: Schema + DeserializeOwned>(raw: Value) -> Result<Vec<T>, SchemaError> {
    let Value::Array(items) = raw else {
        return Err(SchemaError::new(
            T::KIND,
            format!("expected a list, got {}", json_type(&raw)),
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| parse(item).map_err(|e| e.within(&format!("[{i}]"))))
        .collect()
}

/// Validate a `{group: [record, ...]}` object, e.g. hosts keyed by inbound tag.
pub fn parse_grouped<T: Schema + DeserializeOwned>(
    raw: Value,
) -> Result<HashMap<String, Vec<T>>, SchemaError> {
    let Value::Object(groups) = raw else {
        return Err(SchemaError::new(
            T::KIND,
            format!("expected an object of lists, got {}", json_type(&raw)),
        ));
    };

    let mut out = HashMap::with_capacity(groups.len());
    for (group, items) in groups {
        let records = parse_list(items).map_err(|e| e.within(&group))?;
        out.insert(group, records);
    }
    Ok(out)
}

/// Accept any JSON object; contents are not inspected.
pub fn parse_object(kind: EntityKind, raw: Value) -> Result<Map<String, Value>, SchemaError> {
    match raw {
        Value::Object(map) => Ok(map),
        other => Err(SchemaError::new(
            kind,
            format!("expected an object, got {}", json_type(&other)),
        )),
    }
}

// ── Serialization ────────────────────────────────────────────────────

/// Serialize a create payload with every field present.
pub fn serialize_full<T: FullPayload>(entity: &T) -> Result<Map<String, Value>, SchemaError> {
    to_object(entity)
}

/// Serialize a modify payload with only the fields the caller set.
pub fn serialize_partial<T: PartialPayload>(
    entity: &T,
) -> Result<Map<String, Value>, SchemaError> {
    to_object(entity)
}

fn to_object<T: Schema + Serialize>(entity: &T) -> Result<Map<String, Value>, SchemaError> {
    entity.check().map_err(|m| SchemaError::new(T::KIND, m))?;

    match serde_json::to_value(entity) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(SchemaError::new(
            T::KIND,
            format!("serialized to {}, expected an object", json_type(&other)),
        )),
        Err(e) => Err(SchemaError::new(T::KIND, e.to_string())),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
