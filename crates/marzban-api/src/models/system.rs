// Core and system statistics

use serde::{Deserialize, Serialize};

use crate::schema::{EntityKind, Schema};

/// xray core state -- `GET /api/core`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreStats {
    pub version: String,
    pub started: bool,
    pub logs_websocket: String,
}

impl Schema for CoreStats {
    const KIND: EntityKind = EntityKind::CoreStats;
}

/// Host and user metrics -- `GET /api/system`.
///
/// Integer counters are unsigned, so negative values fail deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStats {
    pub version: String,
    pub mem_total: u64,
    pub mem_used: u64,
    pub cpu_cores: u32,
    pub cpu_usage: f64,
    pub total_user: u64,
    pub users_active: u64,
    pub incoming_bandwidth: u64,
    pub outgoing_bandwidth: u64,
    pub incoming_bandwidth_speed: u64,
    pub outgoing_bandwidth_speed: u64,
}

impl Schema for SystemStats {
    const KIND: EntityKind = EntityKind::SystemStats;

    fn check(&self) -> Result<(), String> {
        if self.cpu_usage.is_finite() && self.cpu_usage >= 0.0 {
            Ok(())
        } else {
            Err(format!("cpu_usage must be non-negative, got {}", self.cpu_usage))
        }
    }
}
