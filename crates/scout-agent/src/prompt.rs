// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Answer-prompt assembly.

use std::fmt::Write;

use scout_core::{ChatMessage, SearchResult};
use scout_memory::ScoredMemory;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Scout, a careful research assistant. \
Answer the user's question directly and accurately. When web sources are provided, \
ground your answer in them and cite them by number like [1]. If the sources do not \
cover the question, say so instead of guessing.";

/// Renders retrieved memories and search results as grounding context.
/// Returns an empty string when there is nothing to ground on.
pub fn grounding_context(memories: &[ScoredMemory], sources: &[SearchResult]) -> String {
    let mut context = String::new();

    if !memories.is_empty() {
        context.push_str("Things you remember about the user and past conversations:\n");
        for memory in memories {
            let _ = writeln!(context, "- {}", memory.item.content);
        }
    }

    if !sources.is_empty() {
        if !context.is_empty() {
            context.push('\n');
        }
        context.push_str("Web sources:\n");
        for (i, source) in sources.iter().enumerate() {
            let body = source
                .extracted_content
                .as_deref()
                .filter(|c| !c.is_empty())
                .unwrap_or(&source.snippet);
            let _ = writeln!(context, "[{}] {} ({})\n{}\n", i + 1, source.title, source.url, body);
        }
    }

    context.trim_end().to_string()
}

/// Builds the message list for the answer call.
pub fn answer_messages(
    system_prompt: &str,
    context: &str,
    plan: &str,
    history: Vec<ChatMessage>,
    question: &str,
) -> Vec<ChatMessage> {
    let mut system = system_prompt.to_string();
    if !context.is_empty() {
        let _ = write!(system, "\n\n{context}");
    }
    if !plan.is_empty() {
        let _ = write!(system, "\n\nAnswer plan:\n{plan}");
    }

    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(system));
    messages.extend(history);
    messages.push(ChatMessage::user(question));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_core::Role;
    use scout_memory::MemoryItem;

    fn memory(content: &str) -> ScoredMemory {
        ScoredMemory {
            item: MemoryItem {
                id: 1,
                content: content.into(),
                tags: Default::default(),
                importance: 0.5,
                embedding: None,
                timestamp: chrono::Utc::now(),
                source: "conversation".into(),
            },
            similarity: 0.8,
        }
    }

    #[test]
    fn context_prefers_extracted_content() {
        let mut with_page = SearchResult::new("A", "https://a", "snippet a");
        with_page.extracted_content = Some("full page a".into());
        let snippet_only = SearchResult::new("B", "https://b", "snippet b");

        let context = grounding_context(&[memory("User lives in Lyon")], &[with_page, snippet_only]);
        assert!(context.contains("- User lives in Lyon"));
        assert!(context.contains("[1] A (https://a)\nfull page a"));
        assert!(context.contains("[2] B (https://b)\nsnippet b"));
        assert!(grounding_context(&[], &[]).is_empty());
    }

    #[test]
    fn messages_are_system_history_question() {
        let messages = answer_messages(
            "sys",
            "ctx",
            "",
            vec![ChatMessage::user("old q"), ChatMessage::assistant("old a")],
            "new q",
        );
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, "sys\n\nctx");
        assert_eq!(messages[3].content, "new q");
    }
}
