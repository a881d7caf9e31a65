use crate::domain::model::InactivityResult;
use crate::utils::error::{QuietusError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = QuietusError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(QuietusError::Config {
                message: format!("Unsupported report format '{}'. Valid formats: text, json", other),
            }),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Plain text report: a leading newline, then one line per organization.
pub fn render_text(results: &[InactivityResult]) -> String {
    results.iter().fold(String::from("\n"), |mut report, result| {
        report.push_str(&format!(
            "{} feed has been inactive for {} day(s).\n",
            result.name, result.inactive_days
        ));
        report
    })
}

pub fn render_json(results: &[InactivityResult]) -> Result<String> {
    Ok(serde_json::to_string_pretty(results)?)
}

pub fn render(results: &[InactivityResult], format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(results)),
        ReportFormat::Json => render_json(results),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, days: i64) -> InactivityResult {
        InactivityResult {
            name: name.to_string(),
            feed_url: format!("http://{}.test/rss", name.to_lowercase()),
            inactive_days: days,
        }
    }

    #[test]
    fn test_empty_report_is_a_single_newline() {
        assert_eq!(render_text(&[]), "\n");
    }

    #[test]
    fn test_lines_follow_input_order() {
        let report = render_text(&[result("Zeta", 30), result("Acme", 10)]);
        assert_eq!(
            report,
            "\nZeta feed has been inactive for 30 day(s).\nAcme feed has been inactive for 10 day(s).\n"
        );
    }

    #[test]
    fn test_json_report() {
        let report = render(&[result("Acme", 10)], ReportFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&report).unwrap();

        assert_eq!(parsed[0]["name"], "Acme");
        assert_eq!(parsed[0]["feed_url"], "http://acme.test/rss");
        assert_eq!(parsed[0]["inactive_days"], 10);
    }

    #[test]
    fn test_report_format_from_str() {
        assert_eq!("TEXT".parse::<ReportFormat>().unwrap(), ReportFormat::Text);
        assert_eq!("json".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert!("csv".parse::<ReportFormat>().is_err());
    }
}
