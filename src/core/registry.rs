//! Organization registry: one `Name,FeedUrl` pair per line.

use crate::core::Storage;
use crate::domain::model::Organization;
use crate::utils::error::{QuietusError, Result};
use crate::utils::validation::validate_path;

/// Reads the registry at `path` through `storage` and parses it.
pub async fn load_registry<S: Storage>(storage: &S, path: &str) -> Result<Vec<Organization>> {
    validate_path("registry_path", path)?;

    let bytes = storage.read_file(path).await.map_err(|e| match e {
        QuietusError::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
            QuietusError::NotFound {
                path: path.to_string(),
            }
        }
        other => other,
    })?;

    let content = String::from_utf8(bytes).map_err(|e| QuietusError::Parse {
        line: 0,
        content: path.to_string(),
        reason: format!("registry is not valid UTF-8: {}", e),
    })?;

    let organizations = parse_registry(&content)?;
    tracing::debug!("Loaded {} organizations from {}", organizations.len(), path);
    Ok(organizations)
}

/// Parses registry text. Blank lines are skipped; any other line without a
/// name and a URL separated by a comma fails the whole registry.
pub fn parse_registry(content: &str) -> Result<Vec<Organization>> {
    let content = content.strip_prefix('\u{FEFF}').unwrap_or(content);

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| parse_line(index + 1, line))
        .collect()
}

fn parse_line(line_number: usize, line: &str) -> Result<Organization> {
    let malformed = |reason: &str| QuietusError::Parse {
        line: line_number,
        content: line.to_string(),
        reason: reason.to_string(),
    };

    // Split at the first comma only; URLs may contain commas, names may not.
    let (name, feed_url) = line
        .split_once(',')
        .ok_or_else(|| malformed("expected 'Name,FeedUrl'"))?;

    if name.trim().is_empty() {
        return Err(malformed("organization name is empty"));
    }

    let feed_url = feed_url.trim();
    if feed_url.is_empty() {
        return Err(malformed("feed URL is empty"));
    }

    Ok(Organization::new(name, feed_url))
}
