// Node records

use serde::{Deserialize, Serialize};

use crate::schema::{EntityKind, FullPayload, PartialPayload, Schema};

pub const DEFAULT_NODE_PORT: u16 = 62050;
pub const DEFAULT_API_PORT: u16 = 62051;

/// Connection state of a node as reported by the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    Connected,
    Connecting,
    Error,
    Disabled,
}

/// A node -- from `GET /api/node/{id}` and `GET /api/nodes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub port: u16,
    pub api_port: u16,
    pub usage_coefficient: f64,
    #[serde(default)]
    pub xray_version: Option<String>,
    pub status: NodeStatus,
    #[serde(default)]
    pub message: Option<String>,
}

impl Schema for Node {
    const KIND: EntityKind = EntityKind::Node;
}

/// Body of `POST /api/node`. Every field is sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeCreate {
    pub name: String,
    pub address: String,
    pub port: u16,
    pub api_port: u16,
    pub usage_coefficient: f64,
    pub add_as_new_host: bool,
}

impl NodeCreate {
    /// A node on the default ports with coefficient 1.0, added as a new host.
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            port: DEFAULT_NODE_PORT,
            api_port: DEFAULT_API_PORT,
            usage_coefficient: 1.0,
            add_as_new_host: true,
        }
    }
}

impl Schema for NodeCreate {
    const KIND: EntityKind = EntityKind::NodeCreate;
}

impl FullPayload for NodeCreate {}

/// Body of `PUT /api/node/{id}`. Only set fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeModify {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_coefficient: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<NodeStatus>,
}

impl Schema for NodeModify {
    const KIND: EntityKind = EntityKind::NodeModify;
}

impl PartialPayload for NodeModify {}

/// Certificate a node needs to trust the panel -- `GET /api/node/settings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSettings {
    #[serde(default = "default_min_node_version")]
    pub min_node_version: String,
    pub certificate: String,
}

fn default_min_node_version() -> String {
    "v0.2.0".to_owned()
}

impl Schema for NodeSettings {
    const KIND: EntityKind = EntityKind::NodeSettings;
}

/// Traffic totals of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeUsage {
    /// `None` for the panel's own core.
    #[serde(default)]
    pub node_id: Option<i64>,
    pub node_name: String,
    pub uplink: u64,
    pub downlink: u64,
}

/// `GET /api/nodes/usage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodesUsage {
    pub usages: Vec<NodeUsage>,
}

impl Schema for NodesUsage {
    const KIND: EntityKind = EntityKind::NodesUsage;
}
