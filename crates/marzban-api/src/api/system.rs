// System and proxy metadata endpoints

use std::collections::HashMap;

use super::client::{Call, MarzbanClient};
use crate::error::Error;
use crate::models::{ProxyHost, ProxyInbound, SystemStats};
use crate::schema;

impl MarzbanClient {
    /// `GET /api/system`
    pub async fn get_system_stats(&self) -> Result<SystemStats, Error> {
        let url = self.endpoint(&["api", "system"])?;
        let raw = self.send_json(Call::get(url)).await?;
        Ok(schema::parse(raw)?)
    }

    /// Inbounds keyed by protocol (`vless`, `vmess`, ...).
    ///
    /// `GET /api/inbounds`
    pub async fn get_inbounds(&self) -> Result<HashMap<String, Vec<ProxyInbound>>, Error> {
        let url = self.endpoint(&["api", "inbounds"])?;
        let raw = self.send_json(Call::get(url)).await?;
        Ok(schema::parse_grouped(raw)?)
    }

    /// Hosts keyed by inbound tag.
    ///
    /// `GET /api/hosts`
    pub async fn get_hosts(&self) -> Result<HashMap<String, Vec<ProxyHost>>, Error> {
        let url = self.endpoint(&["api", "hosts"])?;
        let raw = self.send_json(Call::get(url)).await?;
        Ok(schema::parse_grouped(raw)?)
    }
}
