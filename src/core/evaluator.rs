use crate::domain::model::{Assessment, InactivityResult, Organization};
use chrono::{DateTime, Utc};

/// Whole days between `last_published` and `now`, fractional days dropped.
pub fn elapsed_days(now: DateTime<Utc>, last_published: DateTime<Utc>) -> i64 {
    (now - last_published).num_days()
}

/// Measures an organization against `now`. Returns `None` when the feed gave
/// no timestamp, which makes the organization not evaluable.
pub fn assess(
    organization: &Organization,
    last_published: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<Assessment> {
    let last_published = last_published?;
    Some(Assessment {
        organization: organization.clone(),
        last_published,
        inactive_days: elapsed_days(now, last_published),
    })
}

/// Inclusive threshold check: silent for `threshold_days` or more.
pub fn is_inactive(assessment: &Assessment, threshold_days: u32) -> bool {
    assessment.inactive_days >= i64::from(threshold_days)
}

pub fn classify(assessment: &Assessment, threshold_days: u32) -> Option<InactivityResult> {
    is_inactive(assessment, threshold_days).then(|| InactivityResult::from(assessment))
}
