pub mod prompt;
pub mod storage;
pub mod toml_config;

use crate::core::entities::DEFAULT_MAX_ENTITY_CHARACTERS;
use crate::core::feed_client::{DEFAULT_TIMEOUT_SECONDS, DEFAULT_USER_AGENT};
use crate::core::report::ReportFormat;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, Validate,
};
use clap::Parser;
use prompt::Prompter;
use std::io::{BufRead, Write};
use std::time::Duration;
use toml_config::TomlConfig;

pub const DEFAULT_INACTIVITY_PERIOD_DAYS: u32 = 7;

#[derive(Debug, Clone, Parser)]
#[command(name = "quietus")]
#[command(about = "Reports organizations whose news feeds have gone quiet")]
pub struct CliArgs {
    /// Registry file with one 'Name,FeedUrl' pair per line
    pub registry: Option<String>,

    /// Days without a new post before a feed counts as inactive
    #[arg(allow_hyphen_values = true)]
    pub inactivity_days: Option<String>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long, help = "User-Agent sent with feed requests [default: Quietus/1.0]")]
    pub user_agent: Option<String>,

    #[arg(long, help = "Per-request timeout in seconds [default: 30]")]
    pub timeout_seconds: Option<u64>,

    #[arg(long, help = "Cap on characters produced by DTD entity expansion [default: 1024]")]
    pub max_entity_characters: Option<usize>,

    /// Also write the report to this file
    #[arg(short, long)]
    pub output: Option<String>,

    #[arg(long, help = "Report format: text or json [default: text]")]
    pub format: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub registry_path: String,
    pub inactivity_period_days: u32,
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_entity_characters: usize,
    pub output_path: Option<String>,
    pub report_format: ReportFormat,
}

impl Settings {
    /// Merges command line, config file and defaults, asking on the console
    /// for a registry path or inactivity period that is still missing.
    pub fn resolve<R: BufRead, W: Write>(
        args: &CliArgs,
        file: Option<&TomlConfig>,
        prompter: &mut Prompter<R, W>,
    ) -> Result<Self> {
        let file = file.cloned().unwrap_or_default();

        let registry_path = match args.registry.clone().or(file.registry.path) {
            Some(path) => path,
            None => prompter
                .ask("Please provide the full path to the registry file, e.g. '/home/me/organizations.txt'.")?
                .unwrap_or_default(),
        };

        let from_args = args.inactivity_days.as_deref().and_then(|raw| {
            let parsed = raw.trim().parse::<u32>().ok();
            if parsed.is_none() {
                tracing::warn!("Ignoring inactivity period '{}': not a whole number of days", raw);
            }
            parsed
        });

        let inactivity_period_days = match from_args.or(file.evaluation.inactivity_period_days) {
            Some(days) => days,
            None => {
                let answer = prompter.ask("Please provide the duration of the inactivity period in days.")?;
                match answer.and_then(|a| a.parse::<u32>().ok()) {
                    Some(days) => days,
                    None => {
                        prompter.notify(&format!(
                            "Unable to parse user input, using default period of {} days.",
                            DEFAULT_INACTIVITY_PERIOD_DAYS
                        ))?;
                        DEFAULT_INACTIVITY_PERIOD_DAYS
                    }
                }
            }
        };

        let report_format = match args.format.as_deref() {
            Some(raw) => raw.parse::<ReportFormat>()?,
            None => file.report.format.unwrap_or_default(),
        };

        Ok(Self {
            registry_path,
            inactivity_period_days,
            user_agent: args
                .user_agent
                .clone()
                .or(file.feed.user_agent)
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            timeout_seconds: args
                .timeout_seconds
                .or(file.feed.timeout_seconds)
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
            max_entity_characters: args
                .max_entity_characters
                .or(file.feed.max_entity_characters)
                .unwrap_or(DEFAULT_MAX_ENTITY_CHARACTERS),
            output_path: args.output.clone().or(file.report.output_path),
            report_format,
        })
    }
}

impl ConfigProvider for Settings {
    fn registry_path(&self) -> &str {
        &self.registry_path
    }

    fn inactivity_period_days(&self) -> u32 {
        self.inactivity_period_days
    }

    fn user_agent(&self) -> &str {
        &self.user_agent
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn max_entity_characters(&self) -> usize {
        self.max_entity_characters
    }

    fn output_path(&self) -> Option<&str> {
        self.output_path.as_deref()
    }

    fn report_format(&self) -> ReportFormat {
        self.report_format
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_path("registry_path", &self.registry_path)?;
        validate_non_empty_string("user_agent", &self.user_agent)?;
        validate_positive_number("timeout_seconds", self.timeout_seconds, 1)?;
        if let Some(output_path) = &self.output_path {
            validate_path("output_path", output_path)?;
        }
        Ok(())
    }
}
