// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query-list parsing, URL normalization, and the round-continuation rule.

use std::sync::LazyLock;

use regex::Regex;
use scout_core::Complexity;

/// `1. text`, `2) text`, `- text`, `* text`, or `• text`.
static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\d+[.)]|[-*•])\s+(.+?)\s*$").expect("list item pattern compiles")
});

/// Parses a numbered or bulleted list into its items, in order.
///
/// Lines that are not list items are ignored, so prose around the list is
/// harmless. Text with no list items yields nothing.
pub fn parse_query_list(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| LIST_ITEM.captures(line))
        .filter_map(|caps| caps.get(1))
        .map(|m| {
            m.as_str()
                .trim_matches(|c: char| c == '"' || c == '\'' || c == '`')
                .trim()
                .to_string()
        })
        .filter(|item| !item.is_empty())
        .collect()
}

/// The deduplication key for a result URL.
pub fn normalize_url(url: &str) -> String {
    url.trim().to_lowercase()
}

/// Outcome of the continuation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinueDecision {
    pub continue_searching: bool,
    pub reasoning: String,
}

/// Decides whether another search round is worthwhile given the results
/// gathered so far.
pub fn should_continue_searching(result_count: usize, complexity: Complexity) -> ContinueDecision {
    let high = complexity == Complexity::High;
    let (continue_searching, reasoning) = match result_count {
        0 => (true, "No results yet; trying another query.".to_string()),
        1..=2 if high => (
            true,
            format!("Only {result_count} results for a complex question; searching further."),
        ),
        1..=2 => (
            false,
            format!("{result_count} results are enough for a {complexity} complexity question."),
        ),
        3..=4 if high => (
            true,
            format!("{result_count} results; a complex question benefits from more sources."),
        ),
        3..=7 => (
            false,
            format!("{result_count} results provide enough coverage."),
        ),
        _ => (
            false,
            format!("{result_count} results gathered; stopping search."),
        ),
    };
    ContinueDecision {
        continue_searching,
        reasoning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_list() {
        assert_eq!(
            parse_query_list("1. weather today\n2. forecast this week"),
            vec!["weather today", "forecast this week"]
        );
    }

    #[test]
    fn bullets_parens_and_quotes() {
        let text = "Here are some queries:\n- \"paris weather\"\n* paris forecast\n• météo paris\n3) paris rain";
        assert_eq!(
            parse_query_list(text),
            vec!["paris weather", "paris forecast", "météo paris", "paris rain"]
        );
    }

    #[test]
    fn text_without_list_items_yields_nothing() {
        assert!(parse_query_list("  just one query  ").is_empty());
        assert!(parse_query_list("2024 was a year").is_empty());
        assert!(parse_query_list("   ").is_empty());
    }

    #[test]
    fn prose_around_the_list_is_ignored() {
        let text = "Here are some queries:\n1. \"rust 1.90\"\n2. `rust release notes`\nHope that helps.";
        assert_eq!(parse_query_list(text), vec!["rust 1.90", "rust release notes"]);
    }

    #[test]
    fn continuation_table() {
        use Complexity::*;
        let cont = |n, c| should_continue_searching(n, c).continue_searching;
        assert!(cont(0, Medium));
        assert!(cont(0, Low));
        assert!(cont(2, High));
        assert!(!cont(2, Medium));
        assert!(cont(4, High));
        assert!(!cont(5, High));
        assert!(!cont(7, High));
        assert!(!cont(4, Low));
        assert!(!cont(8, High));
        assert!(!cont(50, High));
    }

    #[test]
    fn urls_normalize_case_and_whitespace() {
        assert_eq!(normalize_url(" HTTPS://Example.com/A "), "https://example.com/a");
    }
}
