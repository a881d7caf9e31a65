use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One tracked organization, as read from a registry line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    name: String,
    feed_url: String,
}

impl Organization {
    pub fn new(name: impl Into<String>, feed_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            feed_url: feed_url.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn feed_url(&self) -> &str {
        &self.feed_url
    }
}

/// A feed entry reduced to the fields inactivity checks care about.
/// Timestamps that the feed does not carry stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub title: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

/// A parsed feed. Items keep the order the publisher served them in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedDocument {
    pub title: Option<String>,
    pub items: Vec<FeedItem>,
}

impl From<feed_rs::model::Feed> for FeedDocument {
    fn from(feed: feed_rs::model::Feed) -> Self {
        Self {
            title: feed.title.map(|t| t.content),
            items: feed
                .entries
                .into_iter()
                .map(|entry| FeedItem {
                    title: entry.title.map(|t| t.content),
                    published: entry.published,
                    updated: entry.updated,
                })
                .collect(),
        }
    }
}

/// Elapsed inactivity measured for an organization whose feed yielded a
/// timestamp, independent of any threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub organization: Organization,
    pub last_published: DateTime<Utc>,
    pub inactive_days: i64,
}

/// An organization that has been silent for at least the threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InactivityResult {
    pub name: String,
    pub feed_url: String,
    pub inactive_days: i64,
}

impl From<&Assessment> for InactivityResult {
    fn from(assessment: &Assessment) -> Self {
        Self {
            name: assessment.organization.name().to_string(),
            feed_url: assessment.organization.feed_url().to_string(),
            inactive_days: assessment.inactive_days,
        }
    }
}

/// A feed that could not be checked during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedCheck {
    pub organization: Organization,
    pub reason: String,
}

/// Everything a run learned, in registry order.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    pub checked: usize,
    pub assessments: Vec<Assessment>,
    pub inactive: Vec<InactivityResult>,
    pub not_evaluable: Vec<Organization>,
    pub failures: Vec<FailedCheck>,
}
