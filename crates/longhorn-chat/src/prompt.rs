//! Augmented prompt construction.

/// Persona and answering instructions prepended to every prompt.
pub const PERSONA_DIRECTIVE: &str = "You are an expert question answering system designed to \
help people learn more about the University of Texas. I'll give you a question and context \
based on UT history and you'll return the answer. Use an easy Texan drawl accent when \
answering questions. Keep the responses on the shorter side especially if including texas \
jokes or something like that.";

/// Formats the fixed instructional template around a query and its context.
#[derive(Debug, Clone, Default)]
pub struct PromptComposer {
    max_context_chars: Option<usize>,
}

impl PromptComposer {
    /// Composer that inserts context verbatim, however long.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the context at `max` characters.
    pub fn with_max_context_chars(mut self, max: Option<usize>) -> Self {
        self.max_context_chars = max;
        self
    }

    /// Build the prompt from the query and the best-ranked context.
    ///
    /// Only the first context is used. With no context the `Contexts:`
    /// section is left empty.
    pub fn compose<S: AsRef<str>>(&self, query: &str, contexts: &[S]) -> String {
        let context = contexts.first().map(AsRef::as_ref).unwrap_or("");
        let context = match self.max_context_chars {
            Some(max) => truncate_chars(context, max),
            None => context,
        };
        format!(
            "{} Query: {} Contexts: {}",
            PERSONA_DIRECTIVE, query, context
        )
    }
}

/// Longest prefix of `text` holding at most `max` chars.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_layout() {
        let prompt = PromptComposer::new().compose("When was UT founded?", &["Founded in 1883."]);
        assert!(prompt.starts_with("You are an expert question answering system"));
        assert!(prompt.ends_with("Query: When was UT founded? Contexts: Founded in 1883."));
        assert!(prompt.contains("Texan drawl"));
    }

    #[test]
    fn test_only_first_context_used() {
        let prompt = PromptComposer::new().compose("q", &["first", "second", "third"]);
        assert!(prompt.ends_with("Contexts: first"));
        assert!(!prompt.contains("second"));
    }

    #[test]
    fn test_unbounded_by_default() {
        let context = "x".repeat(100_000);
        let prompt = PromptComposer::new().compose("q", &[context.as_str()]);
        assert!(prompt.ends_with(&context));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let composer = PromptComposer::new().with_max_context_chars(Some(3));
        let prompt = composer.compose("q", &["héllo wörld"]);
        assert!(prompt.ends_with("Contexts: hél"));
    }

    #[test]
    fn test_compose_is_deterministic() {
        let composer = PromptComposer::new();
        assert_eq!(
            composer.compose("q", &["ctx"]),
            composer.compose("q", &["ctx"])
        );
    }
}
