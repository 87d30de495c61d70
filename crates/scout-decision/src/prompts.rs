// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Phase prompts for the decision engine.

pub(crate) const ANALYSIS_SYSTEM: &str = "You analyze user questions before they are answered. \
Be concise. You may reason inside <think></think> tags.";

pub(crate) const ANALYSIS_PROMPT: &str = r#"Analyze this question: what is being asked, what kind of information is needed, and how hard it is to answer well.

Question: {query}

Finish with a line of the form:
COMPLEXITY: low|medium|high"#;

pub(crate) const SEARCH_DECISION_PROMPT: &str = r#"Decide whether answering this question requires searching the web for current or external information.

Question: {query}
Analysis: {analysis}

Answer YES or NO first, then one sentence of justification."#;

pub(crate) const PLAN_PROMPT: &str = r#"Plan how to answer this question in two or three sentences: what to cover, in what order, and which sources to lean on.

Question: {query}
Available context: {context}"#;

pub(crate) const EVALUATION_PROMPT: &str = r#"Assess this answer in one or two sentences: is it accurate, complete, and well grounded in the available information?

Question: {query}
Answer: {answer}"#;
