//! Headline and body search over the outline.
//!
//! # Responsibility
//! - Loose headline matching for command lookups.
//! - Regex filtering of positions by headline or body.
//! - Headline paths (UNLs) that name a position for humans.

use crate::model::position::Position;
use crate::service::outline::{Outline, OutlineResult};
use once_cell::sync::Lazy;
use regex::Regex;

/// Separator between headlines in a UNL.
pub const UNL_SEPARATOR: &str = "-->";

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Case- and whitespace-insensitive prefix match.
///
/// Leading periods are ignored on both sides, so `". Intro"` matches `"intro"`.
pub fn match_headline(headline: &str, pattern: &str) -> bool {
    let headline = squash(headline);
    let pattern = squash(pattern);
    headline.starts_with(pattern.as_str())
}

fn squash(value: &str) -> String {
    let lowered = WHITESPACE_RE.replace_all(value, "").to_lowercase();
    lowered.trim_start_matches('.').to_string()
}

impl Outline {
    /// Positions whose headline matches `pattern`, in outline order.
    pub fn filter_headlines(&self, pattern: &Regex) -> Vec<Position> {
        self.all_positions()
            .filter(|position| {
                self.headline(position)
                    .map(|headline| pattern.is_match(headline))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Positions whose body matches `pattern`, in outline order.
    pub fn filter_bodies(&self, pattern: &Regex) -> Vec<Position> {
        self.all_positions()
            .filter(|position| {
                self.body(position)
                    .map(|body| pattern.is_match(body))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// First position whose headline loosely starts with `pattern`.
    pub fn find_headline(&self, pattern: &str) -> Option<Position> {
        self.all_positions().find(|position| {
            self.headline(position)
                .map(|headline| match_headline(headline, pattern))
                .unwrap_or(false)
        })
    }

    /// Headlines from the top level down to `position`, joined by `-->`.
    ///
    /// A literal `-->` inside a headline is written as `--%3E`.
    pub fn unl(&self, position: &Position) -> OutlineResult<String> {
        let mut parts = Vec::new();
        for each in self.self_and_parents(position)?.iter().rev() {
            parts.push(self.headline(each)?.replace(UNL_SEPARATOR, "--%3E"));
        }
        Ok(parts.join(UNL_SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::match_headline;

    #[test]
    fn match_ignores_case_space_and_leading_periods() {
        assert!(match_headline("@file  Read Me.txt", "@fileread"));
        assert!(match_headline(". Intro", "intro"));
        assert!(!match_headline("Intro", "outro"));
    }

    #[test]
    fn empty_pattern_matches_everything() {
        assert!(match_headline("anything", ""));
    }
}
