//! Command-line interface definitions for Wirescout.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Most options can also be provided via environment variables, which is how
//! the watcher is driven from CI schedulers.

use clap::Parser;

/// Command-line arguments for the Wirescout watcher.
///
/// One invocation is one batch pass: scrape every configured site, email
/// the articles that were not in the previous snapshot, and overwrite the
/// snapshot with the current set.
///
/// # Examples
///
/// ```sh
/// # Site list from a file, snapshot next to it
/// wirescout --sites sites.json --state-file state.json
///
/// # Site list from the SITES_CONFIG environment variable
/// wirescout
///
/// # See what would be emailed without sending anything
/// wirescout --sites sites.json --dry-run
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to a JSON file holding the site list; falls back to the
    /// SITES_CONFIG environment variable when omitted
    #[arg(short, long)]
    pub sites: Option<String>,

    /// Path of the snapshot file recording the previous run's articles
    #[arg(long, env = "STATE_FILE", default_value = "state.json")]
    pub state_file: String,

    /// Scrape and diff, but log new articles instead of emailing them
    #[arg(long)]
    pub dry_run: bool,

    /// Clear the snapshot file and exit; the next run reports everything
    /// as new
    #[arg(long)]
    pub reset_state: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["wirescout"]);
        assert!(cli.sites.is_none());
        assert_eq!(cli.state_file, "state.json");
        assert!(!cli.dry_run);
        assert!(!cli.reset_state);
    }

    #[test]
    fn test_cli_full_invocation() {
        let cli = Cli::parse_from([
            "wirescout",
            "--sites",
            "sites.json",
            "--state-file",
            "/var/lib/wirescout/state.json",
            "--dry-run",
        ]);

        assert_eq!(cli.sites.as_deref(), Some("sites.json"));
        assert_eq!(cli.state_file, "/var/lib/wirescout/state.json");
        assert!(cli.dry_run);
    }

    #[test]
    fn test_cli_short_sites_flag() {
        let cli = Cli::parse_from(["wirescout", "-s", "sites.json"]);
        assert_eq!(cli.sites.as_deref(), Some("sites.json"));
    }
}
