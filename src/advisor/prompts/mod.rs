
/// Returned verbatim for questions outside the advisor's scope
pub const REJECTION_MESSAGE: &str = "This tool answers questions about Canadian accessibility laws,
regulations, and standards (like ACA, AODA, and WCAG).

For other topics, please try a different resource.";

pub const SAMPLE_QUESTIONS: [&str; 5] = [
    "What laws apply to federally regulated businesses?",
    "Does Alberta have web accessibility laws?",
    "Who needs to comply with AODA?",
    "WCAG 2.0 vs 2.1?",
    "What WCAG level does Canada require?",
];

const VERIFIER_TEMPLATE: &str = r#"You are a Canadian Accessibility Advisor intake agent.

Determine if the question is about Canadian accessibility laws, regulations, or WCAG.

If NOT relevant, respond: {"is_relevant": false}
If relevant, respond: {"is_relevant": true}

Question: {question}"#;

const ADVISOR_TEMPLATE: &str = "You are a Canadian Accessibility Advisor.

Question: {question}

Relevant Documents:
{search_results}

Provide a clear answer that:
- Addresses the question directly
- Cites laws/standards as [Source: Document Name]
- States clearly if no law applies
";

/// Prompt asking the verifier model for a strict JSON relevance verdict
#[inline]
pub fn verifier_prompt(question: &str) -> String {
    VERIFIER_TEMPLATE.replace("{question}", question)
}

/// Prompt asking the advisor model for a cited answer grounded in `search_results`
#[inline]
pub fn advisor_prompt(question: &str, search_results: &str) -> String {
    // Substitute results first so a question containing the placeholder text stays literal
    ADVISOR_TEMPLATE
        .replace("{search_results}", search_results)
        .replacen("{question}", question, 1)
}
