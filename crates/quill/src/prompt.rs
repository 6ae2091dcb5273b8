//! Prompt enrichment

const DIRECTIVE_PREFIX: &str = "rewrite ";
const DIRECTIVE_SUFFIX: &str = "in the voice of Shakespeare";

/// Wrap a raw question in the Shakespeare rewrite directive.
///
/// No separator is inserted between the question and the suffix, so
/// `"Hello"` becomes `"rewrite Helloin the voice of Shakespeare"`. Existing
/// clients depend on this exact text.
pub fn enrich(question: &str) -> String {
    let mut prompt =
        String::with_capacity(DIRECTIVE_PREFIX.len() + question.len() + DIRECTIVE_SUFFIX.len());
    prompt.push_str(DIRECTIVE_PREFIX);
    prompt.push_str(question);
    prompt.push_str(DIRECTIVE_SUFFIX);
    prompt
}
