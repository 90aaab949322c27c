//! Delivery of new-article digests.
//!
//! The [`Notifier`] trait is the seam between the run controller and the
//! outside world; [`EmailNotifier`] is the production implementation,
//! sending one HTML digest over SMTP per run. Delivery is best-effort: the
//! controller logs a failed send and moves on, it never retries here.

use crate::config::EmailConfig;
use crate::models::ArticleRecord;
use anyhow::{Context, Result};
use lettre::message::{Mailbox, Message, header};
use lettre::transport::smtp::{AsyncSmtpTransport, authentication::Credentials};
use lettre::{AsyncTransport, Tokio1Executor};
use tracing::{info, instrument};

/// Trait for handing a batch of new records to a delivery channel.
pub trait Notifier {
    /// Deliver `records` to the configured destination.
    async fn send(&self, records: &[ArticleRecord]) -> Result<()>;
}

/// SMTP email digest sender.
pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    recipients: Vec<Mailbox>,
}

impl EmailNotifier {
    /// Build the transport and parse addresses up front, so bad settings
    /// surface at startup rather than mid-run.
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let creds = Credentials::new(config.username.clone(), config.password.clone());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .with_context(|| format!("invalid SMTP host {}", config.host))?
            .port(config.port)
            .credentials(creds)
            .build();

        let from: Mailbox = config
            .from
            .parse()
            .with_context(|| format!("invalid from address {}", config.from))?;
        let recipients = config
            .recipients
            .iter()
            .map(|addr| {
                addr.parse::<Mailbox>()
                    .with_context(|| format!("invalid recipient address {addr}"))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            mailer,
            from,
            recipients,
        })
    }
}

impl Notifier for EmailNotifier {
    #[instrument(level = "info", skip_all, fields(count = records.len()))]
    async fn send(&self, records: &[ArticleRecord]) -> Result<()> {
        let subject = format!(
            "Wirescout: {} new article{}",
            records.len(),
            if records.len() == 1 { "" } else { "s" }
        );

        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(subject)
            .header(header::ContentType::TEXT_HTML);
        for recipient in &self.recipients {
            builder = builder.to(recipient.clone());
        }

        let message = builder
            .body(render_digest(records))
            .context("building digest email")?;

        self.mailer
            .send(message)
            .await
            .context("sending digest email")?;
        info!(recipients = self.recipients.len(), "Digest email sent");
        Ok(())
    }
}

/// Notifier for `--dry-run`: logs what would have been sent.
pub struct DryRunNotifier;

impl Notifier for DryRunNotifier {
    async fn send(&self, records: &[ArticleRecord]) -> Result<()> {
        for record in records {
            info!(
                source = %record.source,
                title = %record.title,
                link = record.link.as_deref().unwrap_or("-"),
                "Would notify"
            );
        }
        Ok(())
    }
}

/// Render the HTML digest body for a batch of new records.
///
/// All page-derived text is escaped; links are only emitted when the record
/// carries one.
pub fn render_digest(records: &[ArticleRecord]) -> String {
    let items: String = records
        .iter()
        .map(|record| {
            let title = html_escape::encode_text(&record.title);
            let heading = match &record.link {
                Some(link) => format!(
                    r#"<a href="{}" style="text-decoration: none; color: #2c3e50;"><h3 style="margin: 0 0 8px 0;">{title}</h3></a>"#,
                    html_escape::encode_double_quoted_attribute(link)
                ),
                None => format!(r#"<h3 style="margin: 0 0 8px 0;">{title}</h3>"#),
            };
            let date = if record.raw_date.is_empty() {
                String::new()
            } else {
                format!(
                    r#"<small style="color: #999;">{}</small>"#,
                    html_escape::encode_text(&record.raw_date)
                )
            };
            let summary = if record.summary.is_empty() {
                String::new()
            } else {
                format!(
                    r#"<p style="color: #555; margin: 8px 0 0 0;">{}</p>"#,
                    html_escape::encode_text(&record.summary)
                )
            };
            format!(
                concat!(
                    r#"<div style="margin-bottom: 24px; border-bottom: 1px solid #eee; padding-bottom: 16px;">"#,
                    r#"<small style="color: #999;">{source}</small>"#,
                    "{heading}{date}{summary}</div>"
                ),
                source = html_escape::encode_text(&record.source),
                heading = heading,
                date = date,
                summary = summary,
            )
        })
        .collect();

    format!(
        concat!(
            "<!DOCTYPE html><html><body style=\"font-family: Arial, sans-serif; ",
            "max-width: 600px; margin: 0 auto; padding: 24px;\">",
            "<h2 style=\"color: #2c3e50;\">New Articles Found ({count})</h2>",
            "{items}",
            "<p style=\"text-align: center; color: #999; font-size: 12px;\">",
            "Powered by Wirescout</p></body></html>"
        ),
        count = records.len(),
        items = items,
    )
}
