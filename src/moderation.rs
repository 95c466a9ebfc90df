//! Content moderation for post submissions
//!
//! Stateless classifiers run before any state is written:
//!
//! - **Length**: content must fall within the configured character bounds
//! - **Profanity**: case-insensitive substring match against a lexicon
//! - **Potential names**: capitalized words that do not start a sentence
//!
//! The name heuristic is deliberately blunt. It blocks any mid-sentence word
//! shaped like a proper noun ("I love Mondays" included) and errs toward
//! rejecting the post.

use crate::app_config::ModerationConfig;
use crate::publish::PublishPolicy;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// A single uppercase letter followed by two or more lowercase letters
static NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][a-z]{2,}$").expect("Invalid name regex"));

/// A moderation rule the content broke
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Violation {
    #[error("Content must be at least {min} characters")]
    TooShort { min: usize },
    #[error("Content must be less than {max} characters")]
    TooLong { max: usize },
    #[error("Content contains inappropriate language")]
    Profanity,
    #[error("Content may contain personal names. Please remove them.")]
    PotentialName,
}

impl Violation {
    /// Returns true for either bound of the length rule
    pub fn is_length(&self) -> bool {
        matches!(self, Violation::TooShort { .. } | Violation::TooLong { .. })
    }

    /// Stable rule identifier for API clients
    pub fn rule(&self) -> &'static str {
        match self {
            Violation::TooShort { .. } => "too_short",
            Violation::TooLong { .. } => "too_long",
            Violation::Profanity => "profanity",
            Violation::PotentialName => "potential_name",
        }
    }
}

/// Outcome of [`ContentModerator::validate`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModerationResult {
    pub ok: bool,
    pub violations: Vec<Violation>,
}

impl ModerationResult {
    fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            ok: violations.is_empty(),
            violations,
        }
    }

    /// Converts a failed result into a validation error.
    pub fn into_result(self) -> crate::error::Result<()> {
        if self.ok {
            Ok(())
        } else {
            Err(crate::error::Error::Validation(self.violations))
        }
    }
}

/// Text classifier configured with length bounds and a profanity lexicon
#[derive(Debug, Clone)]
pub struct ContentModerator {
    min_characters: usize,
    max_characters: usize,
    /// Lowercased lexicon entries
    lexicon: Vec<String>,
}

impl ContentModerator {
    pub fn new(min_characters: usize, max_characters: usize, lexicon: &[String]) -> Self {
        Self {
            min_characters,
            max_characters,
            lexicon: lexicon
                .iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &ModerationConfig) -> Self {
        Self::new(
            config.min_characters,
            config.max_characters,
            &config.profanity,
        )
    }

    /// Checks content against every rule and reports all violations at once.
    pub fn validate(&self, content: &str) -> ModerationResult {
        let mut violations = Vec::new();

        let length = content.chars().count();
        if length < self.min_characters {
            violations.push(Violation::TooShort {
                min: self.min_characters,
            });
        } else if length > self.max_characters {
            violations.push(Violation::TooLong {
                max: self.max_characters,
            });
        }

        if self.contains_profanity(content) {
            violations.push(Violation::Profanity);
        }

        if contains_potential_name(content) {
            violations.push(Violation::PotentialName);
        }

        ModerationResult::from_violations(violations)
    }

    /// Case-insensitive substring match against the lexicon
    pub fn contains_profanity(&self, content: &str) -> bool {
        let lower = content.to_lowercase();
        self.lexicon.iter().any(|word| lower.contains(word.as_str()))
    }
}

/// Returns true if any word other than the first of a sentence looks like a
/// proper noun. Sentences end at `.`, `!` or `?`; words split on whitespace
/// and keep any attached punctuation.
pub fn contains_potential_name(content: &str) -> bool {
    content.split(['.', '!', '?']).any(|sentence| {
        sentence
            .split_whitespace()
            .skip(1)
            .any(|word| NAME_REGEX.is_match(word))
    })
}

/// Everything the post lifecycle consults before it writes
#[derive(Debug, Clone)]
pub struct ModerationRules {
    pub content: ContentModerator,
    pub publish: PublishPolicy,
    pub auto_hide_reports_threshold: i32,
}

impl ModerationRules {
    pub fn from_config(config: &ModerationConfig) -> Self {
        Self {
            content: ContentModerator::from_config(config),
            publish: PublishPolicy::from_config(config),
            auto_hide_reports_threshold: config.auto_hide_reports_threshold,
        }
    }
}

impl Default for ModerationRules {
    fn default() -> Self {
        Self::from_config(&ModerationConfig::default())
    }
}
