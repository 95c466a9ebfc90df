//! Delayed publishing and the edit window.
//!
//! Visibility is never written by a scheduler. It is derived at read time from
//! `publish_at` against the current time, so the same predicate backs both the
//! in-memory check and the SQL filter used by listings.

use crate::app_config::ModerationConfig;
use crate::orm::posts;
use chrono::{Duration, NaiveDateTime};
use sea_orm::{ColumnTrait, Condition};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishPolicy {
    pub publish_delay: Duration,
    pub edit_window: Duration,
}

impl PublishPolicy {
    pub fn new(publish_delay_minutes: i64, edit_window_minutes: i64) -> Self {
        Self {
            publish_delay: Duration::minutes(publish_delay_minutes),
            edit_window: Duration::minutes(edit_window_minutes),
        }
    }

    pub fn from_config(config: &ModerationConfig) -> Self {
        Self::new(config.publish_delay_minutes, config.edit_window_minutes)
    }

    /// Time at which a post created at `now` becomes eligible for readers
    pub fn compute_publish_at(&self, now: NaiveDateTime) -> NaiveDateTime {
        now + self.publish_delay
    }

    /// The author may edit while no more than the edit window has elapsed.
    ///
    /// The window outlasts the publish delay, so a post stays editable for a
    /// short while after it becomes visible.
    pub fn is_editable(&self, post: &posts::Model, now: NaiveDateTime) -> bool {
        now - post.created_at <= self.edit_window
    }

    /// Whole minutes left in the edit window, rounded up. Never zero while the
    /// post is still editable; zero once expired.
    pub fn edit_time_remaining(&self, post: &posts::Model, now: NaiveDateTime) -> i64 {
        if !self.is_editable(post, now) {
            return 0;
        }
        let remaining = self.edit_window - (now - post.created_at);
        let millis = remaining.num_milliseconds();
        ((millis + 59_999) / 60_000).max(1)
    }
}

impl Default for PublishPolicy {
    fn default() -> Self {
        Self::from_config(&ModerationConfig::default())
    }
}

/// True once the publish delay has passed or the post was published explicitly
pub fn is_published(post: &posts::Model, now: NaiveDateTime) -> bool {
    post.is_published || now >= post.publish_at
}

/// A post is visible to readers iff it is not hidden and is published.
pub fn is_visible(post: &posts::Model, now: NaiveDateTime) -> bool {
    !post.is_hidden && is_published(post, now)
}

/// SQL form of [`is_visible`] for use in listing queries.
pub fn visible_condition(now: NaiveDateTime) -> Condition {
    Condition::all()
        .add(posts::Column::IsHidden.eq(false))
        .add(
            Condition::any()
                .add(posts::Column::IsPublished.eq(true))
                .add(posts::Column::PublishAt.lte(now)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::posts::{EmploymentStatus, Sentiment};
    use chrono::NaiveDate;

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn post_at(created_at: NaiveDateTime, policy: &PublishPolicy) -> posts::Model {
        posts::Model {
            id: 1,
            company_id: 1,
            user_id: Some(1),
            primary_category: "wlb".to_string(),
            sub_category: None,
            employment_status: EmploymentStatus::Current,
            team_function: None,
            location: None,
            sentiment: Sentiment::Neutral,
            content: String::new(),
            matches_count: 0,
            not_matches_count: 0,
            common_issue: 0,
            recent: 0,
            still_happening: 0,
            management_driven: 0,
            reports_count: 0,
            is_hidden: false,
            is_published: false,
            publish_at: policy.compute_publish_at(created_at),
            visibility_score: 0.0,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_publish_at_is_delayed() {
        let policy = PublishPolicy::default();
        assert_eq!(policy.compute_publish_at(t0()), t0() + Duration::minutes(3));
    }

    #[test]
    fn test_not_visible_until_delay_passes() {
        let policy = PublishPolicy::default();
        let post = post_at(t0(), &policy);

        assert!(!is_visible(&post, t0()));
        assert!(!is_visible(&post, t0() + Duration::seconds(179)));
        assert!(is_visible(&post, t0() + Duration::minutes(3)));
        assert!(is_visible(&post, t0() + Duration::minutes(3) + Duration::seconds(1)));
    }

    #[test]
    fn test_explicit_publish_skips_delay() {
        let policy = PublishPolicy::default();
        let mut post = post_at(t0(), &policy);
        post.is_published = true;
        assert!(is_visible(&post, t0()));
    }

    #[test]
    fn test_hidden_is_never_visible() {
        let policy = PublishPolicy::default();
        let mut post = post_at(t0(), &policy);
        post.is_hidden = true;
        post.is_published = true;
        assert!(!is_visible(&post, t0() + Duration::days(1)));
    }

    #[test]
    fn test_edit_window() {
        let policy = PublishPolicy::default();
        let post = post_at(t0(), &policy);

        assert!(policy.is_editable(&post, t0() + Duration::seconds(4 * 60 + 59)));
        assert!(policy.is_editable(&post, t0() + Duration::minutes(5)));
        assert!(!policy.is_editable(&post, t0() + Duration::seconds(5 * 60 + 1)));
    }

    #[test]
    fn test_editable_after_becoming_visible() {
        let policy = PublishPolicy::default();
        let post = post_at(t0(), &policy);
        let now = t0() + Duration::minutes(4);
        assert!(is_visible(&post, now));
        assert!(policy.is_editable(&post, now));
    }

    #[test]
    fn test_edit_time_remaining_rounds_up() {
        let policy = PublishPolicy::default();
        let post = post_at(t0(), &policy);

        assert_eq!(policy.edit_time_remaining(&post, t0()), 5);
        assert_eq!(policy.edit_time_remaining(&post, t0() + Duration::seconds(61)), 4);
        assert_eq!(policy.edit_time_remaining(&post, t0() + Duration::minutes(6)), 0);
    }

    #[test]
    fn test_edit_time_remaining_last_second() {
        let policy = PublishPolicy::default();
        let post = post_at(t0(), &policy);

        let nearly_closed = t0() + Duration::minutes(5) - Duration::milliseconds(500);
        assert!(policy.is_editable(&post, nearly_closed));
        assert_eq!(policy.edit_time_remaining(&post, nearly_closed), 1);

        let closing = t0() + Duration::minutes(5);
        assert!(policy.is_editable(&post, closing));
        assert_eq!(policy.edit_time_remaining(&post, closing), 1);

        let closed = closing + Duration::milliseconds(1);
        assert_eq!(policy.edit_time_remaining(&post, closed), 0);
    }
}
