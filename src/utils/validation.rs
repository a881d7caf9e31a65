use crate::utils::error::{FetchFailure, QuietusError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Checks a feed URL before any request is made. An empty value is an
/// argument error; anything that is not an absolute http(s) URL fails the
/// fetch for that feed.
pub fn validate_feed_url(url_str: &str) -> Result<Url> {
    if url_str.trim().is_empty() {
        return Err(QuietusError::InvalidArgument {
            field: "feed_url".to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(QuietusError::feed_fetch(
                url_str,
                FetchFailure::InvalidUrl(format!("unsupported URL scheme: {}", scheme)),
            )),
        },
        Err(e) => Err(QuietusError::feed_fetch(
            url_str,
            FetchFailure::InvalidUrl(e.to_string()),
        )),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(QuietusError::InvalidArgument {
            field: field_name.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(QuietusError::InvalidArgument {
            field: field_name.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(QuietusError::Config {
            message: format!("{} must be at least {} (got {})", field_name, min_value, value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(QuietusError::Config {
            message: format!("{} cannot be empty or whitespace-only", field_name),
        });
    }
    Ok(())
}
