use bl_core::text::truncate_chars;
use bl_core::{Article, ReferenceDocument};

pub const SYSTEM_PROMPT: &str = "You are a professional content writer.";

/// Builds the user message asking for a rewrite in the style of the references.
///
/// Each reference contributes its URL and at most `reference_chars`
/// characters of its text.
pub fn build_rewrite_prompt(
    article: &Article,
    references: &[ReferenceDocument],
    reference_chars: usize,
) -> String {
    let references = references
        .iter()
        .enumerate()
        .map(|(i, reference)| {
            format!(
                "Reference {}:\nURL: {}\nContent: {}",
                i + 1,
                reference.url,
                truncate_chars(&reference.content, reference_chars)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are a content writer. Rewrite the following article to match the style and formatting of top-ranking articles.

Original Article:
Title: {}
Content: {}

Reference Articles for Style:
{}

Instructions:
1. Keep the core message and information from the original article
2. Improve readability and structure
3. Match the professional tone of top-ranking articles
4. Make it engaging and informative
5. Keep it concise but comprehensive

Provide only the rewritten article content without any meta-commentary.",
        article.title, article.content, references
    )
}
