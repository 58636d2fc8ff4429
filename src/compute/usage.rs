//! Simple tenant usage response types

use serde::Deserialize;

/// Body of `GET os-simple-tenant-usage/{project}`
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TenantUsageResponse {
    #[serde(default)]
    pub tenant_usage: TenantUsage,
}

/// Usage of one project; empty when the project had no servers in the window
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TenantUsage {
    #[serde(default)]
    pub server_usages: Vec<ServerUsage>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServerUsage {
    pub instance_id: String,
    pub name: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub ended_at: Option<String>,
    #[serde(default)]
    pub uptime: Option<i64>,
    #[serde(default)]
    pub vcpus: Option<u32>,
    #[serde(default)]
    pub memory_mb: Option<u64>,
    #[serde(default)]
    pub local_gb: Option<u64>,
}

/// Accounting status for a compute VM state
pub fn vm_status(state: &str) -> &'static str {
    match state.to_lowercase().as_str() {
        "active" | "build" | "building" | "confirming_resize" | "hard_reboot" | "migrating"
        | "password" | "reboot" | "rebuild" | "rescue" | "resize" | "revert_resize"
        | "verify_resize" | "saving" => "started",
        "deleted" | "shutoff" | "terminated" | "soft_deleted" => "completed",
        "stopped" => "stopped",
        "paused" => "paused",
        "suspended" | "shelved" | "shelved_offloaded" => "suspended",
        "error" => "error",
        _ => "unknown",
    }
}
