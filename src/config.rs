//! Startup configuration: the site list and SMTP settings.
//!
//! Sites come from a JSON array, either a file named on the command line or
//! the `SITES_CONFIG` environment variable. SMTP settings come from the
//! environment (a `.env` file is honored via dotenvy). An empty site list or
//! missing email settings are fatal startup conditions; a single invalid
//! site spec is dropped with a warning so it cannot take the rest of the
//! run down with it.

use crate::models::SiteSpec;
use anyhow::{Context, Result, bail};
use tracing::{info, warn};

/// SMTP settings for the digest email.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub recipients: Vec<String>,
}

/// Default relay when `EMAIL_HOST` is unset.
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 587;

/// Parse and validate the site list from its JSON form.
///
/// Invalid specs are logged and dropped; an empty surviving list is fatal.
pub fn parse_sites(raw: &str) -> Result<Vec<SiteSpec>> {
    let sites: Vec<SiteSpec> =
        serde_json::from_str(raw).context("parsing sites configuration JSON")?;

    let mut valid = Vec::with_capacity(sites.len());
    for site in sites {
        match site.validate() {
            Ok(()) => valid.push(site),
            Err(e) => {
                warn!(site = %site.name, error = %e, "Dropping invalid site spec");
            }
        }
    }

    if valid.is_empty() {
        bail!("no valid sites configured");
    }
    info!(count = valid.len(), "Loaded site configuration");
    Ok(valid)
}

/// Load the site list from a file, or from `SITES_CONFIG` when no file is
/// given.
pub fn load_sites(sites_file: Option<&str>) -> Result<Vec<SiteSpec>> {
    let raw = match sites_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading sites file {path}"))?,
        None => std::env::var("SITES_CONFIG")
            .context("no sites file given and SITES_CONFIG is not set")?,
    };
    parse_sites(&raw)
}

/// Assemble SMTP settings from the environment.
///
/// `EMAIL_USER`, `EMAIL_PASS`, `EMAIL_FROM`, and `EMAIL_RECIPIENTS` are
/// required; host and port fall back to Gmail's STARTTLS relay.
pub fn email_from_env() -> Result<EmailConfig> {
    let host = std::env::var("EMAIL_HOST").unwrap_or_else(|_| DEFAULT_SMTP_HOST.to_string());
    let port = match std::env::var("EMAIL_PORT") {
        Ok(raw) => raw
            .parse::<u16>()
            .with_context(|| format!("EMAIL_PORT is not a port number: {raw}"))?,
        Err(_) => DEFAULT_SMTP_PORT,
    };
    let username = std::env::var("EMAIL_USER").context("EMAIL_USER is not set")?;
    let password = std::env::var("EMAIL_PASS").context("EMAIL_PASS is not set")?;
    let from = std::env::var("EMAIL_FROM").context("EMAIL_FROM is not set")?;
    let recipients = parse_recipients(
        &std::env::var("EMAIL_RECIPIENTS").context("EMAIL_RECIPIENTS is not set")?,
    );
    if recipients.is_empty() {
        bail!("EMAIL_RECIPIENTS contains no addresses");
    }

    Ok(EmailConfig {
        host,
        port,
        username,
        password,
        from,
        recipients,
    })
}

/// Split a comma-separated recipient list, trimming and dropping blanks.
pub fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|addr| !addr.is_empty())
        .map(str::to_string)
        .collect()
}
