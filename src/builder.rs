use crate::error::BuildError;
use crate::session::{DisplayDuration, WordConfig};

/// Split free text on newlines and commas, trimming and dropping empty tokens
pub fn parse_words(text: &str) -> Vec<String> {
    text.split(['\n', ','])
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Turn the setup text area into a session config
pub fn build_config(text: &str, duration: DisplayDuration) -> Result<WordConfig, BuildError> {
    WordConfig::new(parse_words(text), duration)
}
