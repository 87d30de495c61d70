// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query complexity derivation.

use std::str::FromStr;

use scout_core::Complexity;

/// Phrases that signal multi-part or comparative questions.
const COMPLEX_MARKERS: &[&str] = &[
    "compare",
    "comparison",
    "versus",
    " vs ",
    "difference between",
    "pros and cons",
    "explain why",
    "analyze",
    "analyse",
    "step by step",
    "in depth",
    "history of",
    "impact of",
];

/// Reads a `COMPLEXITY: <level>` line from analysis text, falling back to
/// [`lexical_complexity`] on the query when none parses.
pub fn derive_complexity(analysis: &str, query: &str) -> Complexity {
    analysis
        .lines()
        .find_map(|line| {
            let (label, value) = line.split_once(':')?;
            let label = label.trim_matches(|c: char| !c.is_ascii_alphabetic());
            if !label.eq_ignore_ascii_case("complexity") {
                return None;
            }
            let word = value
                .trim()
                .trim_matches(|c: char| !c.is_ascii_alphabetic())
                .split(|c: char| !c.is_ascii_alphabetic())
                .next()?;
            Complexity::from_str(word).ok()
        })
        .unwrap_or_else(|| lexical_complexity(query))
}

/// Estimates complexity from the query text alone.
pub fn lexical_complexity(query: &str) -> Complexity {
    let lower = format!(" {} ", query.to_lowercase());
    let words = query.split_whitespace().count();

    if words > 25 || COMPLEX_MARKERS.iter().any(|m| lower.contains(m)) {
        Complexity::High
    } else if words <= 6 {
        Complexity::Low
    } else {
        Complexity::Medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_label_wins() {
        let analysis = "The user wants a forecast.\nCOMPLEXITY: high\n";
        assert_eq!(derive_complexity(analysis, "weather?"), Complexity::High);
    }

    #[test]
    fn label_tolerates_markdown_and_case() {
        assert_eq!(
            derive_complexity("**Complexity**: Low.", "a long question about many things"),
            Complexity::Low
        );
        assert_eq!(
            derive_complexity("- complexity: MEDIUM (some context)", "hi"),
            Complexity::Medium
        );
    }

    #[test]
    fn unparseable_label_falls_back_to_lexical() {
        assert_eq!(derive_complexity("COMPLEXITY: extreme", "What is 2+2?"), Complexity::Low);
        assert_eq!(derive_complexity("", "What is 2+2?"), Complexity::Low);
    }

    #[test]
    fn lexical_markers_and_length() {
        assert_eq!(
            lexical_complexity("Compare Rust and Go for web servers"),
            Complexity::High
        );
        assert_eq!(lexical_complexity("rust vs go"), Complexity::High);
        assert_eq!(
            lexical_complexity("What's the current weather in Paris today?"),
            Complexity::Medium
        );
        assert_eq!(lexical_complexity("hello there"), Complexity::Low);
    }
}
