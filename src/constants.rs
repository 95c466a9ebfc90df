//! Platform constants
//!
//! Defaults for the tunable moderation limits live here; the running values
//! come from [`crate::app_config::ModerationConfig`].

/// Minimum post length in characters
pub const MIN_CHARACTERS: usize = 150;

/// Maximum post length in characters
pub const MAX_CHARACTERS: usize = 1500;

/// Minutes between post creation and public visibility.
/// Decouples the moment of submission from the moment a post can be read.
pub const PUBLISH_DELAY_MINUTES: i64 = 3;

/// Minutes after creation during which the author may still edit
pub const EDIT_WINDOW_MINUTES: i64 = 5;

/// Report count at which a post is hidden pending review
pub const AUTO_HIDE_REPORTS_THRESHOLD: i32 = 5;

/// Number of validation votes at which the visibility score reaches full confidence
pub const FULL_CONFIDENCE_VOTES: f64 = 10.0;

/// Default page size for company post listings
pub const DEFAULT_POST_LIMIT: u64 = 50;

/// Default page size for the company directory
pub const DEFAULT_COMPANY_LIMIT: u64 = 20;

/// Default profanity lexicon, matched as case-insensitive substrings
pub const DEFAULT_PROFANITY: &[&str] = &["damn", "shit", "fuck", "bastard", "asshole", "bitch"];

/// Trust weight recorded for every signed-in user
pub const TRUST_LOGGED_IN_USER: f64 = 0.7;

/// Primary categories and the sub-categories that belong to each
pub const CATEGORIES: &[(&str, &str, &[&str])] = &[
    (
        "manager",
        "Manager behavior / toxicity",
        &[
            "micromanagement",
            "public_humiliation",
            "credit_stealing",
            "unrealistic_expectations",
            "poor_communication",
            "favoritism",
        ],
    ),
    (
        "wlb",
        "Work-life balance / night calls",
        &["night_calls", "weekend_work", "no_boundaries", "burnout", "long_hours"],
    ),
    (
        "salary",
        "Salary / CTC / appraisal",
        &["delayed_salary", "low_appraisal", "false_promises", "below_market", "no_transparency"],
    ),
    (
        "layoffs",
        "Layoffs / job insecurity",
        &["sudden_layoffs", "no_severance", "mass_layoffs", "performance_excuse"],
    ),
    (
        "hr",
        "HR policies / pressure",
        &["toxic_policies", "biased_hr", "no_support", "forced_resignation"],
    ),
    (
        "culture",
        "Team culture / favoritism",
        &["office_politics", "cliques", "discrimination", "no_recognition", "blame_culture"],
    ),
    (
        "hiring",
        "Hiring / interviews",
        &["fake_job_posting", "lowball_offer", "unprofessional", "long_process"],
    ),
];

/// Team functions offered by the submission flow
pub const TEAM_FUNCTIONS: &[&str] = &[
    "Engineering",
    "Product",
    "Design",
    "Sales",
    "Marketing",
    "Support",
    "HR",
    "Finance",
    "Operations",
    "Other",
];

/// Returns the display label for a primary category id
pub fn category_label(id: &str) -> Option<&'static str> {
    CATEGORIES
        .iter()
        .find(|(cat, _, _)| *cat == id)
        .map(|(_, label, _)| *label)
}

/// Returns the sub-categories of a primary category, or None if the category is unknown
pub fn sub_categories(id: &str) -> Option<&'static [&'static str]> {
    CATEGORIES
        .iter()
        .find(|(cat, _, _)| *cat == id)
        .map(|(_, _, subs)| *subs)
}
