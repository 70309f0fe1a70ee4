/// Tunables of a [`FormStore`](super::FormStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormOptions {
    pub history_limit: usize,
    pub default_title: String,
    pub consent_keywords: Vec<String>,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            history_limit: 10,
            default_title: "Untitled Form".to_string(),
            consent_keywords: vec!["terms".to_string(), "agree".to_string()],
        }
    }
}

impl FormOptions {
    /// Cap on both the undo and the redo stack.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_default_title(mut self, title: impl Into<String>) -> Self {
        self.default_title = title.into();
        self
    }

    /// Label/id fragments marking consent fields whose required check waits
    /// for the final submission.
    pub fn with_consent_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.consent_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }
}
