// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parser for `<think>…</think>` reasoning blocks in generated text.

const OPEN: &str = "<think>";
const CLOSE: &str = "</think>";

/// Generated text split into reasoning blocks and visible remainder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasoningSplit {
    pub thoughts: Vec<String>,
    pub cleaned: String,
}

/// Splits top-level reasoning blocks out of `raw`.
///
/// Nested blocks belong to their outermost block; their tags are dropped from
/// the thought text. Unbalanced input (a stray close tag or an unterminated
/// block) extracts nothing and returns `raw` unchanged.
pub fn extract_thoughts(raw: &str) -> ReasoningSplit {
    let unchanged = || ReasoningSplit {
        thoughts: Vec::new(),
        cleaned: raw.to_string(),
    };

    let mut thoughts = Vec::new();
    let mut visible = String::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut rest = raw;

    loop {
        let next_open = rest.find(OPEN);
        let next_close = rest.find(CLOSE);
        let (pos, is_open) = match (next_open, next_close) {
            (None, None) => break,
            (Some(o), None) => (o, true),
            (None, Some(c)) => (c, false),
            (Some(o), Some(c)) => {
                if o < c {
                    (o, true)
                } else {
                    (c, false)
                }
            }
        };

        let before = &rest[..pos];
        if depth == 0 {
            visible.push_str(before);
        } else {
            current.push_str(before);
        }

        if is_open {
            depth += 1;
            rest = &rest[pos + OPEN.len()..];
        } else {
            if depth == 0 {
                return unchanged();
            }
            depth -= 1;
            if depth == 0 {
                let thought = collapse(&current);
                if !thought.is_empty() {
                    thoughts.push(thought);
                }
                current.clear();
            }
            rest = &rest[pos + CLOSE.len()..];
        }
    }

    if depth != 0 {
        return unchanged();
    }
    visible.push_str(rest);

    ReasoningSplit {
        thoughts,
        cleaned: visible.trim().to_string(),
    }
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Incremental filter hiding reasoning blocks from streamed text.
///
/// Text inside blocks is withheld; a tag split across chunks is held back
/// until it can be recognized. A block still open when the stream ends is
/// released verbatim, tags included, and a close tag with no open block is
/// shown as ordinary text.
#[derive(Debug, Default)]
pub struct ReasoningFilter {
    pending: String,
    depth: usize,
    /// Raw text of the open block, from its opening tag.
    withheld: String,
    /// Tag-free text of the open block.
    current: String,
    thoughts: Vec<String>,
}

impl ReasoningFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk and returns the text that is safe to show.
    pub fn push(&mut self, chunk: &str) -> String {
        self.pending.push_str(chunk);
        let mut out = String::new();

        loop {
            let hit = [
                (self.pending.find(OPEN), OPEN),
                (self.pending.find(CLOSE), CLOSE),
            ]
            .into_iter()
            .filter_map(|(pos, t)| pos.map(|p| (p, t)))
            .min_by_key(|(p, _)| *p);

            let Some((pos, tag)) = hit else {
                let keep = partial_tag_suffix(&self.pending);
                let emit_to = self.pending.len() - keep;
                let text: String = self.pending.drain(..emit_to).collect();
                if self.depth == 0 {
                    out.push_str(&text);
                } else {
                    self.withheld.push_str(&text);
                    self.current.push_str(&text);
                }
                break;
            };

            let end = pos + tag.len();
            let consumed: String = self.pending.drain(..end).collect();
            let before = &consumed[..pos];

            match (tag == OPEN, self.depth) {
                (true, 0) => {
                    out.push_str(before);
                    self.withheld.push_str(OPEN);
                    self.depth = 1;
                }
                (false, 0) => out.push_str(&consumed),
                (true, _) => {
                    self.withheld.push_str(&consumed);
                    self.current.push_str(before);
                    self.depth += 1;
                }
                (false, _) => {
                    self.withheld.push_str(&consumed);
                    self.current.push_str(before);
                    self.depth -= 1;
                    if self.depth == 0 {
                        let thought = collapse(&self.current);
                        if !thought.is_empty() {
                            self.thoughts.push(thought);
                        }
                        self.current.clear();
                        self.withheld.clear();
                    }
                }
            }
        }

        out
    }

    /// Flushes held-back text at end of stream, including any unterminated block.
    pub fn finish(&mut self) -> String {
        let rest = std::mem::take(&mut self.pending);
        if self.depth == 0 {
            return rest;
        }
        self.depth = 0;
        self.current.clear();
        let mut released = std::mem::take(&mut self.withheld);
        released.push_str(&rest);
        released
    }

    /// Reasoning blocks closed so far, whitespace-collapsed, in order.
    pub fn thoughts(&self) -> &[String] {
        &self.thoughts
    }
}

/// Length of the longest suffix of `text` that is a proper prefix of a tag.
fn partial_tag_suffix(text: &str) -> usize {
    let max = OPEN.len().max(CLOSE.len()) - 1;
    (1..=max.min(text.len()))
        .rev()
        .find(|&n| {
            text.is_char_boundary(text.len() - n) && {
                let suffix = &text[text.len() - n..];
                OPEN.starts_with(suffix) || CLOSE.starts_with(suffix)
            }
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn plain_text_passes_through() {
        let split = extract_thoughts("  The answer is 4.  ");
        assert!(split.thoughts.is_empty());
        assert_eq!(split.cleaned, "The answer is 4.");
    }

    #[test]
    fn single_block_is_extracted() {
        let split = extract_thoughts("<think>\n  add two\n and two </think>\nThe answer is 4.");
        assert_eq!(split.thoughts, vec!["add two and two"]);
        assert_eq!(split.cleaned, "The answer is 4.");
    }

    #[test]
    fn multiple_blocks_keep_order() {
        let split = extract_thoughts("<think>a</think>one <think>b</think>two");
        assert_eq!(split.thoughts, vec!["a", "b"]);
        assert_eq!(split.cleaned, "one two");
    }

    #[test]
    fn nested_blocks_belong_to_outer() {
        let split = extract_thoughts("<think>outer <think>inner</think> tail</think>visible");
        assert_eq!(split.thoughts, vec!["outer inner tail"]);
        assert_eq!(split.cleaned, "visible");
    }

    #[test]
    fn unterminated_block_returns_text_unchanged() {
        let raw = "<think>never closed. Answer: 4";
        let split = extract_thoughts(raw);
        assert!(split.thoughts.is_empty());
        assert_eq!(split.cleaned, raw);
    }

    #[test]
    fn stray_close_returns_text_unchanged() {
        let raw = "Answer</think> 4";
        let split = extract_thoughts(raw);
        assert!(split.thoughts.is_empty());
        assert_eq!(split.cleaned, raw);
    }

    #[test]
    fn empty_block_yields_no_thought() {
        let split = extract_thoughts("<think>   </think>Hi");
        assert!(split.thoughts.is_empty());
        assert_eq!(split.cleaned, "Hi");
    }

    #[test]
    fn filter_hides_block_split_across_chunks() {
        let mut filter = ReasoningFilter::new();
        let mut shown = String::new();
        for chunk in ["Hel", "lo <thi", "nk>secret", " stuff</th", "ink> world", "!"] {
            shown.push_str(&filter.push(chunk));
        }
        shown.push_str(&filter.finish());
        assert_eq!(shown, "Hello  world!");
    }

    #[test]
    fn filter_releases_false_partial_tag() {
        let mut filter = ReasoningFilter::new();
        assert_eq!(filter.push("a <th"), "a ");
        assert_eq!(filter.push("e end"), "<the end");
        assert_eq!(filter.finish(), "");
    }

    #[test]
    fn filter_releases_unterminated_block_at_finish() {
        let mut filter = ReasoningFilter::new();
        let mut shown = filter.push("<think>never ");
        shown.push_str(&filter.push("closed. The answer is 4"));
        assert_eq!(shown, "");
        shown.push_str(&filter.finish());
        assert_eq!(shown, "<think>never closed. The answer is 4");
        assert!(filter.thoughts().is_empty());
    }

    #[test]
    fn filter_releases_unterminated_nested_block_verbatim() {
        let mut filter = ReasoningFilter::new();
        assert_eq!(filter.push("ok <think>a <think>b</think> c"), "ok ");
        assert_eq!(filter.finish(), "<think>a <think>b</think> c");
    }

    #[test]
    fn filter_shows_stray_close_tag() {
        let mut filter = ReasoningFilter::new();
        let mut shown = filter.push("Answer</th");
        shown.push_str(&filter.push("ink> 4"));
        shown.push_str(&filter.finish());
        assert_eq!(shown, "Answer</think> 4");
    }

    #[test]
    fn filter_collects_closed_thoughts() {
        let mut filter = ReasoningFilter::new();
        filter.push("<think> add\n two </think>4 <think>outer <think>in</think></think>");
        filter.finish();
        assert_eq!(filter.thoughts(), ["add two", "outer in"]);
    }

    proptest! {
        #[test]
        fn filter_matches_batch_extraction(
            parts in prop::collection::vec("[a-z ]{0,6}", 1..6),
            cut in 1usize..8,
        ) {
            let text = format!("{}<think>{}</think>{}", parts[0], parts.join("x"), parts.join("y"));
            let mut filter = ReasoningFilter::new();
            let mut shown = String::new();
            let chars: Vec<char> = text.chars().collect();
            for piece in chars.chunks(cut) {
                shown.push_str(&filter.push(&piece.iter().collect::<String>()));
            }
            shown.push_str(&filter.finish());
            let split = extract_thoughts(&text);
            prop_assert_eq!(shown.trim(), split.cleaned.as_str());
            prop_assert_eq!(filter.thoughts(), split.thoughts.as_slice());
        }
    }
}
