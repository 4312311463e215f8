// xray core endpoints

use super::client::{Call, MarzbanClient};
use crate::error::Error;
use crate::models::{CoreConfig, CoreStats};
use crate::schema::{self, EntityKind};

impl MarzbanClient {
    /// `GET /api/core`
    pub async fn get_core_stats(&self) -> Result<CoreStats, Error> {
        let url = self.endpoint(&["api", "core"])?;
        let raw = self.send_json(Call::get(url)).await?;
        Ok(schema::parse(raw)?)
    }

    /// Restart the core and every connected node.
    ///
    /// `POST /api/core/restart`
    pub async fn restart_core(&self) -> Result<(), Error> {
        let url = self.endpoint(&["api", "core", "restart"])?;
        self.send_empty(Call::post(url)).await
    }

    /// `GET /api/core/config`
    ///
    /// Returned as an open JSON object; only the top-level shape is checked.
    pub async fn get_core_config(&self) -> Result<CoreConfig, Error> {
        let url = self.endpoint(&["api", "core", "config"])?;
        let raw = self.send_json(Call::get(url)).await?;
        Ok(schema::parse_object(EntityKind::CoreConfig, raw)?)
    }

    /// Replace the core configuration; the panel restarts the core.
    ///
    /// `PUT /api/core/config`
    pub async fn modify_core_config(&self, config: &CoreConfig) -> Result<CoreConfig, Error> {
        let url = self.endpoint(&["api", "core", "config"])?;
        let raw = self
            .send_json(Call::put(url).json(config.clone()))
            .await?;
        Ok(schema::parse_object(EntityKind::CoreConfig, raw)?)
    }
}
