//! Degraded-mode defaults
//!
//! Once retries are exhausted the caller gets a typed default instead of an
//! error. The value comes from the return type ([`Degradable`]); the category
//! derived from the operation name drives accounting and logging.

use parking_lot::Mutex;
use tollgate_domain::{DegradedCounts, TollgateError};
use tracing::warn;

const WRITE_PREFIXES: &[&str] =
    &["add_", "remove_", "set_", "create_", "update_", "delete_", "record_", "save_"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DegradedCategory {
    /// Balance reads; default 0
    Points,
    /// Ranked reads; default empty
    Leaderboard,
    /// Gang lookups; default absent
    Gang,
    /// Any other read; default empty
    Read,
    /// Mutations; default false
    Write,
}

impl DegradedCategory {
    /// Classify by operation name; write prefixes win over read keywords
    pub fn classify(operation_name: &str) -> Self {
        let name = operation_name.to_ascii_lowercase();
        if WRITE_PREFIXES.iter().any(|prefix| name.starts_with(prefix)) {
            Self::Write
        } else if name.contains("points") {
            Self::Points
        } else if name.contains("leaderboard") {
            Self::Leaderboard
        } else if name.contains("gang") {
            Self::Gang
        } else {
            Self::Read
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Points => "points",
            Self::Leaderboard => "leaderboard",
            Self::Gang => "gang",
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

/// Types with a safe stand-in value
pub trait Degradable: Sized {
    fn degraded(category: DegradedCategory) -> Self;
}

impl Degradable for i64 {
    fn degraded(_: DegradedCategory) -> Self {
        0
    }
}

impl Degradable for bool {
    fn degraded(_: DegradedCategory) -> Self {
        false
    }
}

impl<T> Degradable for Vec<T> {
    fn degraded(_: DegradedCategory) -> Self {
        Vec::new()
    }
}

impl<T> Degradable for Option<T> {
    fn degraded(_: DegradedCategory) -> Self {
        None
    }
}

#[derive(Debug, Default)]
pub struct DegradedModeProvider {
    counts: Mutex<DegradedCounts>,
}

impl DegradedModeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fallback<T: Degradable>(
        &self,
        operation_name: &str,
        last_error: Option<&TollgateError>,
    ) -> T {
        let category = DegradedCategory::classify(operation_name);
        {
            let mut counts = self.counts.lock();
            match category {
                DegradedCategory::Points => counts.points += 1,
                DegradedCategory::Leaderboard => counts.leaderboard += 1,
                DegradedCategory::Gang => counts.gang += 1,
                DegradedCategory::Read => counts.read += 1,
                DegradedCategory::Write => counts.write += 1,
            }
        }

        warn!(
            operation = operation_name,
            category = category.as_str(),
            last_error = last_error.map(|e| e.to_string()).as_deref(),
            "serving degraded-mode default"
        );
        T::degraded(category)
    }

    pub fn counts(&self) -> DegradedCounts {
        *self.counts.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_table() {
        assert_eq!(DegradedCategory::classify("get_user_points"), DegradedCategory::Points);
        assert_eq!(DegradedCategory::classify("get_leaderboard"), DegradedCategory::Leaderboard);
        assert_eq!(DegradedCategory::classify("get_gang"), DegradedCategory::Gang);
        assert_eq!(DegradedCategory::classify("get_inventory"), DegradedCategory::Read);
        assert_eq!(DegradedCategory::classify("get_prison_record"), DegradedCategory::Read);
        assert_eq!(DegradedCategory::classify("add_points"), DegradedCategory::Write);
        assert_eq!(DegradedCategory::classify("create_gang"), DegradedCategory::Write);
        assert_eq!(DegradedCategory::classify("remove_item"), DegradedCategory::Write);
    }

    #[test]
    fn defaults_follow_return_type() {
        let provider = DegradedModeProvider::new();

        let points: i64 = provider.fallback("get_user_points", None);
        let added: bool = provider.fallback("add_points", None);
        let board: Vec<String> = provider.fallback("get_leaderboard", None);
        let gang: Option<String> = provider.fallback("get_gang", None);

        assert_eq!(points, 0);
        assert!(!added);
        assert!(board.is_empty());
        assert!(gang.is_none());
    }

    #[test]
    fn counts_per_category() {
        let provider = DegradedModeProvider::new();
        let err = TollgateError::Connection("refused".into());

        let _: i64 = provider.fallback("get_user_points", Some(&err));
        let _: i64 = provider.fallback("get_user_points", Some(&err));
        let _: bool = provider.fallback("set_prison_record", Some(&err));

        let counts = provider.counts();
        assert_eq!(counts.points, 2);
        assert_eq!(counts.write, 1);
        assert_eq!(counts.total(), 3);
    }
}
