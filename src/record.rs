//! Cloud accounting records
//!
//! A [`CloudRecord`] describes the usage of one virtual machine over an
//! extraction window. Records are rendered as flat maps keyed by the
//! accounting field names of a given [`RecordVersion`].

use crate::error::ExtractError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::str::FromStr;

/// Value of the `CloudType` field unless a backend overrides it
pub const DEFAULT_CLOUD_TYPE: &str =
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

const V02_FIELDS: &[&str] = &[
    "VMUUID",
    "SiteName",
    "MachineName",
    "LocalUserId",
    "LocalGroupId",
    "GlobalUserName",
    "FQAN",
    "Status",
    "StartTime",
    "EndTime",
    "SuspendDuration",
    "WallDuration",
    "CpuDuration",
    "CpuCount",
    "NetworkType",
    "NetworkInbound",
    "NetworkOutbound",
    "Memory",
    "Disk",
    "StorageRecordId",
    "ImageId",
    "CloudType",
];

const V04_EXTRA_FIELDS: &[&str] = &[
    "CloudComputeService",
    "BenchmarkType",
    "Benchmark",
    "PublicIPCount",
];

/// Accounting record format version
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordVersion {
    #[serde(rename = "0.2")]
    V02,
    #[default]
    #[serde(rename = "0.4")]
    V04,
}

impl RecordVersion {
    /// Field names included in this version
    pub fn fields(&self) -> Vec<&'static str> {
        match self {
            Self::V02 => V02_FIELDS.to_vec(),
            Self::V04 => V02_FIELDS
                .iter()
                .chain(V04_EXTRA_FIELDS)
                .copied()
                .collect(),
        }
    }
}

impl FromStr for RecordVersion {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0.2" => Ok(Self::V02),
            "0.4" => Ok(Self::V04),
            other => Err(ExtractError::RecordVersionNotFound(other.to_string())),
        }
    }
}

impl std::fmt::Display for RecordVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::V02 => write!(f, "0.2"),
            Self::V04 => write!(f, "0.4"),
        }
    }
}

/// Usage of a single virtual machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudRecord {
    pub uuid: String,
    pub site: String,
    pub name: String,
    pub user_id: Option<String>,
    pub group_id: String,
    pub fqan: String,
    pub status: Option<String>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub suspend_duration: Option<i64>,
    wall_duration: Option<i64>,
    cpu_duration: Option<i64>,
    pub network_type: Option<String>,
    pub network_in: Option<u64>,
    pub network_out: Option<u64>,
    pub cpu_count: Option<u32>,
    pub memory: Option<u64>,
    pub disk: Option<u64>,
    pub image_id: Option<String>,
    pub cloud_type: String,
    pub storage_record_id: Option<String>,
    pub user_dn: Option<String>,
    pub compute_service: Option<String>,
    pub benchmark_value: Option<f64>,
    pub benchmark_type: Option<String>,
    pub public_ip_count: Option<u32>,
}

impl CloudRecord {
    /// Create a record with its identifying fields; everything else is unset
    pub fn new(
        uuid: impl Into<String>,
        site: impl Into<String>,
        name: impl Into<String>,
        user_id: Option<String>,
        group_id: impl Into<String>,
        fqan: impl Into<String>,
    ) -> Self {
        Self {
            uuid: uuid.into(),
            site: site.into(),
            name: name.into(),
            user_id,
            group_id: group_id.into(),
            fqan: fqan.into(),
            status: None,
            start_time: None,
            end_time: None,
            suspend_duration: None,
            wall_duration: None,
            cpu_duration: None,
            network_type: None,
            network_in: None,
            network_out: None,
            cpu_count: None,
            memory: None,
            disk: None,
            image_id: None,
            cloud_type: DEFAULT_CLOUD_TYPE.to_string(),
            storage_record_id: None,
            user_dn: None,
            compute_service: None,
            benchmark_value: None,
            benchmark_type: None,
            public_ip_count: None,
        }
    }

    /// Override the derived wall clock duration, in seconds
    pub fn set_wall_duration(&mut self, seconds: Option<i64>) {
        self.wall_duration = seconds;
    }

    /// Override the derived CPU duration, in seconds
    pub fn set_cpu_duration(&mut self, seconds: Option<i64>) {
        self.cpu_duration = seconds;
    }

    /// Wall clock seconds: the explicit value if set, otherwise the span
    /// between start and end time when both are known
    pub fn wall_duration(&self) -> Option<i64> {
        if self.wall_duration.is_some() {
            return self.wall_duration;
        }
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some((end - start).num_seconds()),
            _ => None,
        }
    }

    /// CPU seconds: the explicit value if set, otherwise wall duration
    /// times the number of CPUs
    pub fn cpu_duration(&self) -> Option<i64> {
        self.cpu_duration.or_else(|| {
            let cpus = self.cpu_count.filter(|c| *c > 0)?;
            self.wall_duration().map(|wall| wall * i64::from(cpus))
        })
    }

    /// Every accounting field, keyed by its record field name
    pub fn as_map(&self) -> Map<String, Value> {
        let timestamp = |t: Option<NaiveDateTime>| t.map(|t| t.and_utc().timestamp());

        let value = json!({
            "VMUUID": self.uuid,
            "SiteName": self.site,
            "MachineName": self.name,
            "LocalUserId": self.user_id,
            "LocalGroupId": self.group_id,
            "FQAN": self.fqan,
            "Status": self.status,
            "StartTime": timestamp(self.start_time),
            "EndTime": timestamp(self.end_time),
            "SuspendDuration": self.suspend_duration,
            "WallDuration": self.wall_duration(),
            "CpuDuration": self.cpu_duration(),
            "CpuCount": self.cpu_count,
            "NetworkType": self.network_type,
            "NetworkInbound": self.network_in,
            "NetworkOutbound": self.network_out,
            "Memory": self.memory,
            "Disk": self.disk,
            "StorageRecordId": self.storage_record_id,
            "ImageId": self.image_id,
            "CloudType": self.cloud_type,
            "GlobalUserName": self.user_dn,
            "PublicIPCount": self.public_ip_count,
            "Benchmark": self.benchmark_value,
            "BenchmarkType": self.benchmark_type,
            "CloudComputeService": self.compute_service,
        });

        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    /// The fields of `version`, keyed by record field name
    pub fn as_dict(&self, version: RecordVersion) -> Map<String, Value> {
        let fields = version.fields();
        self.as_map()
            .into_iter()
            .filter(|(k, _)| fields.contains(&k.as_str()))
            .collect()
    }

    /// JSON rendering of [`as_dict`](Self::as_dict)
    pub fn as_json(&self, version: RecordVersion) -> eyre::Result<String> {
        Ok(serde_json::to_string(&self.as_dict(version))?)
    }
}
