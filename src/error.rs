use thiserror::Error;

/// Raised when the setup input yields nothing to flash
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Geen woorden gevonden. Selecteer eerst een blok of typ woorden.")]
    EmptyInput,
}

/// Failures of the word suggestion service
#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("no API key configured for the suggestion service")]
    Unconfigured,
    #[error("suggestion request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("suggestion service answered with status {0}")]
    Status(u16),
    #[error("malformed suggestion response: {0}")]
    Malformed(String),
}

impl SuggestError {
    /// Message shown on the setup screen; the cause itself goes to the log
    pub fn user_message(&self) -> &'static str {
        "Kon geen woorden genereren. Probeer het opnieuw of voer ze handmatig in."
    }
}

#[derive(Debug, Error)]
pub enum WordBankError {
    #[error("word bank file not found: {0}")]
    Missing(String),
    #[error("unable to parse word bank file {file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_json::Error,
    },
}
