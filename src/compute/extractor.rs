//! Compute usage extractor
//!
//! Fetches per-server usage via `GET os-simple-tenant-usage/{project}`

use super::usage::{ServerUsage, TenantUsageResponse, vm_status};
use crate::client::ComputeClient;
use crate::dates::parse_timestamp;
use crate::etl::{Extractor, Records};
use crate::record::CloudRecord;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use eyre::{Context, Result};

/// Registry name of this backend
pub const NAME: &str = "nova";

const QUERY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Site level values stamped on every record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComputeSettings {
    /// Accounting site name
    pub site_name: String,
    /// Optional `CloudComputeService` value
    pub compute_service: Option<String>,
}

/// Extractor for compute usage records
///
/// # Example
/// ```no_run
/// use usage_extractor::client::{Auth, ComputeClient};
/// use usage_extractor::compute::{ComputeSettings, ComputeUsageExtractor};
/// use usage_extractor::etl::Extractor;
/// use url::Url;
///
/// # async fn example(from: chrono::NaiveDateTime, to: chrono::NaiveDateTime) -> eyre::Result<()> {
/// let client = ComputeClient::try_new(Url::parse("http://controller:8774/v2.1")?, Auth::None)?;
/// let settings = ComputeSettings { site_name: "SITE".to_string(), compute_service: None };
/// let extractor = ComputeUsageExtractor::new(client, settings);
/// let records = extractor.extract_for_project("research", from, to).await?;
/// # Ok(())
/// # }
/// ```
pub struct ComputeUsageExtractor {
    client: ComputeClient,
    settings: ComputeSettings,
}

impl ComputeUsageExtractor {
    pub fn new(client: ComputeClient, settings: ComputeSettings) -> Self {
        Self { client, settings }
    }

    /// Fetch the usage report of one project
    async fn fetch_usage(
        &self,
        project: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<ServerUsage>> {
        let path = format!("os-simple-tenant-usage/{}", project);
        let query = [
            ("start", from.format(QUERY_FORMAT).to_string()),
            ("end", to.format(QUERY_FORMAT).to_string()),
            ("detailed", "1".to_string()),
        ];

        log::debug!("Fetching usage for project '{}' from {}", project, path);

        let response = self
            .client
            .get(&path, &query)
            .await
            .with_context(|| format!("Failed to fetch usage for project '{}'", project))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            eyre::bail!(
                "Failed to fetch usage for project '{}' ({}): {}",
                project,
                status,
                body
            );
        }

        let usage: TenantUsageResponse = response.json().await.with_context(|| {
            format!("Failed to parse usage response for project '{}'", project)
        })?;

        Ok(usage.tenant_usage.server_usages)
    }

    /// Build the accounting record of one server
    fn build_record(&self, project: &str, usage: ServerUsage) -> CloudRecord {
        let mut record = CloudRecord::new(
            usage.instance_id,
            self.settings.site_name.clone(),
            usage.name,
            None,
            usage.tenant_id.unwrap_or_else(|| project.to_string()),
            project,
        );

        record.status = usage.state.as_deref().map(|s| vm_status(s).to_string());
        record.start_time = usage.started_at.as_deref().and_then(parse_timestamp);
        record.end_time = usage.ended_at.as_deref().and_then(parse_timestamp);
        record.cpu_count = usage.vcpus;
        record.memory = usage.memory_mb;
        record.disk = usage.local_gb;
        record.compute_service = self.settings.compute_service.clone();

        // Running servers have no end time; the report's uptime covers them
        if record.end_time.is_none() {
            record.set_wall_duration(usage.uptime);
        }

        record
    }
}

#[async_trait]
impl Extractor for ComputeUsageExtractor {
    type Record = CloudRecord;

    async fn extract_for_project(
        &self,
        project: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Records<Self::Record>> {
        let usages = self.fetch_usage(project, from, to).await?;

        let records: Records<CloudRecord> = usages
            .into_iter()
            .map(|usage| self.build_record(project, usage))
            .map(|record| (record.uuid.clone(), record))
            .collect();

        log::debug!(
            "Built {} record(s) for project '{}' on {}",
            records.len(),
            project,
            self.client
        );

        Ok(records)
    }
}
