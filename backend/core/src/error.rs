use thiserror::Error;

/// Failures surfaced by a user or mood store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The unique index on `external_user_id` rejected the write.
    #[error("user {external_user_id} is already registered")]
    Duplicate { external_user_id: String },

    /// Connectivity, serialization or any other backend failure.
    #[error("storage error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

/// A reply or push that the messaging platform did not accept.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("messaging API returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("messaging transport error: {0}")]
    Transport(String),
}

/// Top-level error type for the Moodline runtime.
#[derive(Debug, Error)]
pub enum MoodError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to fetch {what}: {source}")]
    Fetch {
        what: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("render error: {0}")]
    Render(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_is_distinguishable() {
        let dup = StoreError::Duplicate { external_user_id: "U1".into() };
        assert!(dup.is_duplicate());
        assert!(!StoreError::backend("disk full").is_duplicate());
        assert_eq!(dup.to_string(), "user U1 is already registered");
    }

    #[test]
    fn fetch_error_names_the_collection() {
        let err = MoodError::Fetch { what: "users", source: StoreError::backend("timeout") };
        assert_eq!(err.to_string(), "failed to fetch users: storage error: timeout");
    }
}
