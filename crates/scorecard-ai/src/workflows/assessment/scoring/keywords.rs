//! Literal keyword tables driving the answer heuristics.
//!
//! Matching is case-insensitive substring containment against lower-cased answers,
//! so every entry here must already be lower case. Trailing spaces are significant
//! (`"no "` must not match "now").

use once_cell::sync::Lazy;
use regex::Regex;

pub(crate) const RADIO_LEADER: &[&str] = &[
    "advanced",
    "extensive",
    "strategic",
    "comprehensive",
    "integrated",
    "sophisticated",
    "enterprise",
    "mature",
    "automated",
    "ai-driven",
    "predictive",
];

pub(crate) const RADIO_ENABLER: &[&str] = &[
    "some",
    "moderate",
    "developing",
    "improving",
    "established",
    "regular",
    "multiple",
    "organized",
    "consistent",
];

pub(crate) const RADIO_DABBLER: &[&str] = &[
    "basic",
    "limited",
    "minimal",
    "occasional",
    "beginning",
    "early",
    "exploring",
    "ad hoc",
    "manual",
    "no ",
    "not ",
    "don't",
    "experimenting",
    "testing",
    "rarely",
    "initial",
    "starting",
    "considering",
    "planning",
    "yet to",
    "haven't",
    "unsure",
    "uncertain",
    "beginner",
    "introduction",
    "introductory",
    "foundation",
    "preliminary",
];

pub(crate) const CHECKBOX_LEADER: &[&str] = &[
    "advanced",
    "extensive",
    "strategic",
    "ai-driven",
    "predictive",
    "automated",
    "enterprise",
    "integrated",
    "sophisticated",
    "comprehensive",
    "machine learning",
    "neural",
    "optimize",
    "transform",
];

pub(crate) const CHECKBOX_DABBLER: &[&str] = &[
    "basic",
    "limited",
    "minimal",
    "manual",
    "simple",
    "occasional",
    "beginning",
    "introduction",
    "initial",
    "trial",
    "testing",
    "single",
    "rarely",
];

pub(crate) const TEXT_LEADER: &[&str] = &[
    "strategy",
    "strategic",
    "comprehensive",
    "integrated",
    "enterprise",
    "advanced",
    "automated",
    "ai-driven",
    "predictive",
    "machine learning",
    "deep learning",
    "neural",
    "transform",
];

pub(crate) const TEXT_DABBLER: &[&str] = &[
    "basic",
    "limited",
    "minimal",
    "beginning",
    "starting",
    "not sure",
    "don't know",
    "haven't",
    "no ",
    "not ",
    "i'm new",
    "we're new",
    "just started",
    "initial stages",
    "exploring",
    "considering",
    "experimenting",
    "testing",
    "trial",
    "simple",
    "occasional",
    "ad hoc",
    "rarely",
    "manual",
    "unsure",
    "uncertain",
    "unfamiliar",
    "learning about",
    "not adopted",
    "not implemented",
    "not utilizing",
];

/// Negations that push a hedging free-text answer down to the floor.
pub(crate) static NEGATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(no |not |haven't|don't)").expect("valid negation pattern"));

/// Broad beginner vocabulary used for the history-wide density correction.
pub(crate) static DABBLER_DENSITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(basic|limited|minimal|occasional|beginning|early|exploring|ad hoc|manual|no |not |don't|haven't|unsure|just started|considering|testing|trial)",
    )
    .expect("valid dabbler density pattern")
});

pub(crate) fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| haystack.contains(keyword))
}

pub(crate) fn count_containing(items: &[String], keywords: &[&str]) -> usize {
    items
        .iter()
        .filter(|item| contains_any(&item.to_lowercase(), keywords))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negation_counts_each_occurrence() {
        let text = "we don't have a plan and have not started, no budget";
        assert_eq!(NEGATION.find_iter(text).count(), 3);
    }

    #[test]
    fn trailing_space_guards_short_words() {
        assert!(!contains_any("we know now", RADIO_DABBLER));
        assert!(contains_any("no formal plan", RADIO_DABBLER));
    }

    #[test]
    fn density_pattern_ignores_case() {
        assert!(DABBLER_DENSITY.is_match("BASIC tooling"));
        assert!(!DABBLER_DENSITY.is_match("Enterprise rollout"));
    }
}
