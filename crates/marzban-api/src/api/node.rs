// Node endpoints

use chrono::{DateTime, Utc};
use tracing::debug;

use super::client::{Call, MarzbanClient};
use crate::error::Error;
use crate::models::{Node, NodeCreate, NodeModify, NodeSettings, NodesUsage};
use crate::schema;

/// Format accepted by the usage endpoint's `start`/`end` parameters.
const USAGE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

impl MarzbanClient {
    /// `POST /api/node`
    pub async fn add_node(&self, node: &NodeCreate) -> Result<Node, Error> {
        let body = schema::serialize_full(node)?;
        let url = self.endpoint(&["api", "node"])?;
        let raw = self.send_json(Call::post(url).json(body)).await?;
        Ok(schema::parse(raw)?)
    }

    /// `GET /api/node/{id}`
    pub async fn get_node(&self, node_id: i64) -> Result<Node, Error> {
        let id = node_id.to_string();
        let url = self.endpoint(&["api", "node", id.as_str()])?;
        let raw = self.send_json(Call::get(url)).await?;
        Ok(schema::parse(raw)?)
    }

    /// `PUT /api/node/{id}`
    pub async fn modify_node(&self, node_id: i64, changes: &NodeModify) -> Result<Node, Error> {
        let body = schema::serialize_partial(changes)?;
        let id = node_id.to_string();
        let url = self.endpoint(&["api", "node", id.as_str()])?;
        let raw = self.send_json(Call::put(url).json(body)).await?;
        Ok(schema::parse(raw)?)
    }

    /// `DELETE /api/node/{id}`
    pub async fn remove_node(&self, node_id: i64) -> Result<(), Error> {
        let id = node_id.to_string();
        let url = self.endpoint(&["api", "node", id.as_str()])?;
        self.send_empty(Call::delete(url)).await
    }

    /// `GET /api/nodes`
    pub async fn get_nodes(&self) -> Result<Vec<Node>, Error> {
        let url = self.endpoint(&["api", "nodes"])?;
        let nodes: Vec<Node> = schema::parse_list(self.send_json(Call::get(url)).await?)?;
        debug!(count = nodes.len(), "listed nodes");
        Ok(nodes)
    }

    /// The certificate nodes must be configured with.
    ///
    /// `GET /api/node/settings`
    pub async fn get_node_settings(&self) -> Result<NodeSettings, Error> {
        let url = self.endpoint(&["api", "node", "settings"])?;
        let raw = self.send_json(Call::get(url)).await?;
        Ok(schema::parse(raw)?)
    }

    /// Per-node traffic, optionally bounded in time.
    ///
    /// `GET /api/nodes/usage?start=&end=`
    pub async fn get_nodes_usage(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<NodesUsage, Error> {
        let url = self.endpoint(&["api", "nodes", "usage"])?;
        let mut call = Call::get(url);
        if let Some(start) = start {
            call = call.query("start", start.format(USAGE_TIME_FORMAT));
        }
        if let Some(end) = end {
            call = call.query("end", end.format(USAGE_TIME_FORMAT));
        }
        let raw = self.send_json(call).await?;
        Ok(schema::parse(raw)?)
    }
}
