use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use revdigest_core::{DigestRequest, Period};
use std::path::PathBuf;

use crate::config::{resolve_group_by, Config};

#[derive(Parser, Debug)]
#[command(name = "revdigest")]
#[command(version, about = "Digest of recent content revisions", long_about = None)]
pub struct Cli {
    /// JSON snapshot with items, revisions, users and taxonomies
    #[arg(short, long, value_name = "FILE")]
    pub store: PathBuf,

    /// Lookback period (day, week, month)
    #[arg(short, long)]
    pub period: Option<Period>,

    /// Explicit cutoff (RFC 3339), overriding the period
    #[arg(long, value_name = "TIMESTAMP")]
    pub since: Option<DateTime<Utc>>,

    /// Grouping dimension (item, date, user, taxonomy)
    #[arg(short, long)]
    pub group_by: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Config file (defaults to <config dir>/revdigest/config.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Leave out the author of the revision that predates the window
    #[arg(long)]
    pub exclude_boundary_author: bool,

    /// Compute the digest as of this instant instead of the wall clock
    #[arg(long, value_name = "TIMESTAMP")]
    pub now: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Group headings with descriptions
    Text,
    /// API-shaped JSON
    Json,
    /// Dashboard widget markup
    Html,
}

impl Cli {
    /// Merge flags over the config file into one request
    pub fn request(&self, config: &Config) -> DigestRequest {
        let mut options = config.collect_options();
        if self.exclude_boundary_author {
            options.include_boundary_author = false;
        }

        let group_by = match &self.group_by {
            Some(value) => resolve_group_by(value),
            None => config.group_by(),
        };

        let mut request = DigestRequest::new(self.period.unwrap_or(config.period))
            .with_group_by(group_by)
            .with_options(options);
        if let Some(since) = self.since {
            request = request.with_cutoff(since);
        }
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use revdigest_core::GroupBy;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "revdigest",
            "--store",
            "site.json",
            "--period",
            "day",
            "--group-by",
            "user",
            "--exclude-boundary-author",
        ])
        .unwrap();
        let config = Config {
            period: Period::Month,
            group_by: "date".to_string(),
            ..Config::default()
        };

        let request = cli.request(&config);
        assert_eq!(request.period, Period::Day);
        assert_eq!(request.group_by, GroupBy::User);
        assert!(!request.options.include_boundary_author);
        assert_eq!(request.cutoff, None);
    }

    #[test]
    fn test_config_used_when_flags_absent() {
        let cli = Cli::try_parse_from(["revdigest", "-s", "site.json"]).unwrap();
        let config = Config {
            period: Period::Month,
            group_by: "taxonomy".to_string(),
            ..Config::default()
        };

        let request = cli.request(&config);
        assert_eq!(request.period, Period::Month);
        assert_eq!(request.group_by, GroupBy::Taxonomy);
        assert_eq!(cli.format, Format::Text);
    }

    #[test]
    fn test_since_sets_cutoff() {
        let cli = Cli::try_parse_from([
            "revdigest",
            "-s",
            "site.json",
            "--since",
            "2024-03-01T00:00:00Z",
            "--format",
            "json",
        ])
        .unwrap();

        let request = cli.request(&Config::default());
        assert_eq!(
            request.cutoff,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(cli.format, Format::Json);
    }

    #[test]
    fn test_invalid_period_rejected() {
        assert!(Cli::try_parse_from(["revdigest", "-s", "x.json", "-p", "year"]).is_err());
    }

    #[test]
    fn test_unknown_group_by_falls_back_to_item() {
        let cli = Cli::try_parse_from(["revdigest", "-s", "x.json", "-g", "colour"]).unwrap();
        assert_eq!(cli.request(&Config::default()).group_by, GroupBy::Item);
    }
}
