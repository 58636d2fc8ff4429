//! CLI helper functions

use crate::{
    client::{Auth, AuthType, ComputeClient},
    compute::{self, ComputeSettings, ComputeUsageExtractor},
    config::Config,
    etl::{BoxedExtractor, ExtractorRegistry, Manager},
    record::CloudRecord,
    storage::RecordWriter,
};
use eyre::{Context, Result};
use url::Url;

/// Load the compute client from environment variables
///
/// Expected environment variables:
/// - COMPUTE_URL: Compute API base URL (required)
/// - COMPUTE_AUTH_TYPE: `token`, `basic` or `none` (optional, inferred from
///   the credentials present when unset)
/// - COMPUTE_TOKEN: Token sent as `X-Auth-Token` (optional)
/// - COMPUTE_USERNAME: Username for basic auth (optional)
/// - COMPUTE_PASSWORD: Password for basic auth (optional)
pub fn load_compute_client() -> Result<ComputeClient> {
    let url_str =
        std::env::var("COMPUTE_URL").context("COMPUTE_URL environment variable not set")?;
    let url = Url::parse(&url_str).with_context(|| format!("Invalid COMPUTE_URL: {}", url_str))?;

    let auth = resolve_auth(
        std::env::var("COMPUTE_AUTH_TYPE").ok().as_deref(),
        std::env::var("COMPUTE_USERNAME").ok(),
        std::env::var("COMPUTE_PASSWORD").ok(),
        std::env::var("COMPUTE_TOKEN").ok(),
    )?;
    log::debug!("Compute authentication: {}", auth);

    ComputeClient::try_new(url, auth).context("Failed to create compute client")
}

/// Pick the authentication method from an optional explicit type and the
/// available credentials
///
/// Without an explicit type a token wins over username and password.
///
/// # Errors
/// Returns an error for an unknown type, or when the requested type lacks
/// its credentials
pub fn resolve_auth(
    auth_type: Option<&str>,
    username: Option<String>,
    password: Option<String>,
    token: Option<String>,
) -> Result<Auth> {
    let auth_type = match auth_type {
        Some(value) => value.parse::<AuthType>().map_err(|_| {
            eyre::eyre!(
                "Invalid COMPUTE_AUTH_TYPE: {} (expected token, basic or none)",
                value
            )
        })?,
        None if token.is_some() => AuthType::Token,
        None if username.is_some() && password.is_some() => AuthType::Basic,
        None => AuthType::None,
    };

    let auth = Auth::new(&auth_type, username, password, token);
    if matches!(auth, Auth::None) && auth_type != AuthType::None {
        eyre::bail!(
            "Missing credentials for {:?} compute authentication",
            auth_type
        );
    }

    Ok(auth)
}

/// Load the site settings from environment variables
///
/// - SITE_NAME: accounting site name (required)
/// - COMPUTE_SERVICE: value of the `CloudComputeService` field (optional)
pub fn load_compute_settings() -> Result<ComputeSettings> {
    let site_name =
        std::env::var("SITE_NAME").context("SITE_NAME environment variable not set")?;
    let compute_service = std::env::var("COMPUTE_SERVICE").ok();

    Ok(ComputeSettings {
        site_name,
        compute_service,
    })
}

/// Every extractor backend shipped with this crate
///
/// Backends read their environment only when selected.
pub fn default_registry() -> ExtractorRegistry<CloudRecord> {
    let mut registry = ExtractorRegistry::new();
    registry.register(compute::NAME, || {
        let client = load_compute_client()?;
        let settings = load_compute_settings()?;
        log::info!("Using compute endpoint {}", client);
        let extractor = ComputeUsageExtractor::new(client, settings);
        Ok(Box::new(extractor) as BoxedExtractor<CloudRecord>)
    });
    registry
}

/// Run one extraction with `registry` and publish the records through `writer`
///
/// Returns the number of records published
pub async fn extract_records(
    config: Config,
    registry: &ExtractorRegistry<CloudRecord>,
    writer: &RecordWriter,
) -> Result<usize> {
    log::info!(
        "Extracting {} project(s) with extractor '{}'",
        config.projects.len(),
        config.extractor
    );
    if config.dry_run {
        log::info!("Dry run enabled, last run files will not be updated");
    }

    let manager = Manager::new(config, registry)?;
    let count = manager.run(writer).await?;

    log::info!(
        "✓ Published {} record(s) to {}",
        count,
        writer.destination()
    );
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    #[test]
    fn test_auth_inferred_from_credentials() {
        let auth = resolve_auth(None, some("admin"), some("secret"), some("gAAAA")).unwrap();
        assert_eq!(auth.to_string(), "Token");

        let auth = resolve_auth(None, some("admin"), some("secret"), None).unwrap();
        assert_eq!(auth.to_string(), "Basic");

        let auth = resolve_auth(None, some("admin"), None, None).unwrap();
        assert_eq!(auth.to_string(), "None");
    }

    #[test]
    fn test_explicit_auth_type() {
        let auth =
            resolve_auth(Some("basic"), some("admin"), some("secret"), some("gAAAA")).unwrap();
        assert_eq!(auth.to_string(), "Basic");

        let auth = resolve_auth(Some("none"), None, None, some("gAAAA")).unwrap();
        assert_eq!(auth.to_string(), "None");
    }

    #[test]
    fn test_explicit_auth_type_without_credentials() {
        let err = resolve_auth(Some("token"), some("admin"), some("secret"), None).unwrap_err();
        assert!(err.to_string().contains("Missing credentials"));
    }

    #[test]
    fn test_unknown_auth_type() {
        let err = resolve_auth(Some("apikey"), None, None, None).unwrap_err();
        assert!(err.to_string().contains("Invalid COMPUTE_AUTH_TYPE"));
    }
}
