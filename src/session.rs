use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::BuildError;

/// Seconds counted down before every word
pub const COUNTDOWN_SECONDS: u32 = 3;

/// How long a word stays visible. A closed set keeps degenerate durations out.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum DisplayDuration {
    #[value(name = "1")]
    #[strum(to_string = "1 sec")]
    One,
    #[value(name = "2")]
    #[strum(to_string = "2 sec")]
    Two,
    #[default]
    #[value(name = "3")]
    #[strum(to_string = "3 sec")]
    Three,
    #[value(name = "5")]
    #[strum(to_string = "5 sec")]
    Five,
    #[value(name = "8")]
    #[strum(to_string = "8 sec")]
    Eight,
}

impl DisplayDuration {
    pub const ALL: [DisplayDuration; 5] = [
        DisplayDuration::One,
        DisplayDuration::Two,
        DisplayDuration::Three,
        DisplayDuration::Five,
        DisplayDuration::Eight,
    ];

    pub fn seconds(self) -> u32 {
        match self {
            DisplayDuration::One => 1,
            DisplayDuration::Two => 2,
            DisplayDuration::Three => 3,
            DisplayDuration::Five => 5,
            DisplayDuration::Eight => 8,
        }
    }

    /// Next shorter duration, saturating at the shortest
    pub fn faster(self) -> Self {
        self.shift(-1)
    }

    /// Next longer duration, saturating at the longest
    pub fn slower(self) -> Self {
        self.shift(1)
    }

    fn shift(self, by: isize) -> Self {
        let idx = Self::ALL.iter().position(|d| *d == self).unwrap_or(2) as isize;
        let next = (idx + by).clamp(0, Self::ALL.len() as isize - 1);
        Self::ALL[next as usize]
    }
}

/// Immutable input of one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordConfig {
    words: Vec<String>,
    display_duration: DisplayDuration,
}

impl WordConfig {
    pub fn new(words: Vec<String>, display_duration: DisplayDuration) -> Result<Self, BuildError> {
        let words: Vec<String> = words
            .into_iter()
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();

        if words.is_empty() {
            return Err(BuildError::EmptyInput);
        }

        Ok(Self {
            words,
            display_duration,
        })
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    // never true for a constructed config, kept for the len/is_empty pair
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn display_duration(&self) -> DisplayDuration {
        self.display_duration
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Countdown,
    Display,
    Waiting,
}

/// Snapshot of the sequencer for one word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    pub current_word_index: usize,
    pub phase: Phase,
    pub remaining_seconds: u32,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            current_word_index: 0,
            phase: Phase::Countdown,
            remaining_seconds: COUNTDOWN_SECONDS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_word_list_is_rejected() {
        assert_eq!(
            WordConfig::new(vec![], DisplayDuration::Three),
            Err(BuildError::EmptyInput)
        );
        assert_eq!(
            WordConfig::new(vec!["  ".into(), "".into()], DisplayDuration::Three),
            Err(BuildError::EmptyInput)
        );
    }

    #[test]
    fn config_keeps_order_and_trims() {
        let cfg = WordConfig::new(
            vec![" vis".into(), "aap ".into(), "noot".into()],
            DisplayDuration::Two,
        )
        .unwrap();

        assert_eq!(cfg.words(), ["vis", "aap", "noot"]);
        assert_eq!(cfg.len(), 3);
        assert_eq!(cfg.display_duration().seconds(), 2);
    }

    #[test]
    fn duration_default_is_three_seconds() {
        assert_eq!(DisplayDuration::default().seconds(), 3);
        assert_eq!(DisplayDuration::default().to_string(), "3 sec");
    }

    #[test]
    fn duration_shift_saturates() {
        assert_eq!(DisplayDuration::One.faster(), DisplayDuration::One);
        assert_eq!(DisplayDuration::Eight.slower(), DisplayDuration::Eight);
        assert_eq!(DisplayDuration::Three.slower(), DisplayDuration::Five);
        assert_eq!(DisplayDuration::Three.faster(), DisplayDuration::Two);
    }

    #[test]
    fn duration_parses_from_cli_value() {
        let d = DisplayDuration::from_str("5", false).unwrap();
        assert_eq!(d, DisplayDuration::Five);
        assert!(DisplayDuration::from_str("4", false).is_err());
    }

    #[test]
    fn session_state_starts_in_countdown() {
        let state = SessionState::default();
        assert_eq!(state.phase, Phase::Countdown);
        assert_eq!(state.remaining_seconds, COUNTDOWN_SECONDS);
        assert_eq!(state.current_word_index, 0);
    }
}
