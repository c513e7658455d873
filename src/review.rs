use std::collections::BTreeMap;

use ratatui::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
pub enum HighlightColor {
    #[default]
    Yellow,
    Green,
    Pink,
    Blue,
}

impl HighlightColor {
    pub const ALL: [HighlightColor; 4] = [
        HighlightColor::Yellow,
        HighlightColor::Green,
        HighlightColor::Pink,
        HighlightColor::Blue,
    ];

    /// Palette slot for number keys 1-4
    pub fn from_digit(c: char) -> Option<Self> {
        c.to_digit(10)
            .and_then(|d| (d as usize).checked_sub(1))
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn background(self) -> Color {
        match self {
            HighlightColor::Yellow => Color::Rgb(253, 224, 71),
            HighlightColor::Green => Color::Rgb(134, 239, 172),
            HighlightColor::Pink => Color::Rgb(249, 168, 212),
            HighlightColor::Blue => Color::Rgb(147, 197, 253),
        }
    }
}

/// Per-character highlights, keyed by word index then char index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotations {
    marks: BTreeMap<usize, BTreeMap<usize, HighlightColor>>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same color again removes the mark, another color replaces it
    pub fn toggle(&mut self, word: usize, ch: usize, color: HighlightColor) {
        let word_marks = self.marks.entry(word).or_default();
        if word_marks.get(&ch) == Some(&color) {
            word_marks.remove(&ch);
            if word_marks.is_empty() {
                self.marks.remove(&word);
            }
        } else {
            word_marks.insert(ch, color);
        }
    }

    pub fn get(&self, word: usize, ch: usize) -> Option<HighlightColor> {
        self.marks.get(&word).and_then(|m| m.get(&ch)).copied()
    }

    pub fn count(&self) -> usize {
        self.marks.values().map(BTreeMap::len).sum()
    }

    pub fn clear(&mut self) {
        self.marks.clear();
    }
}

/// Cursor and palette state of the review screen
#[derive(Debug, Clone, Default)]
pub struct ReviewState {
    pub annotations: Annotations,
    pub active_color: HighlightColor,
    pub word: usize,
    pub ch: usize,
}

impl ReviewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_at_cursor(&mut self) {
        self.annotations.toggle(self.word, self.ch, self.active_color);
    }

    pub fn next_char(&mut self, words: &[String]) {
        let len = char_len(words, self.word);
        if self.ch + 1 < len {
            self.ch += 1;
        } else if self.word + 1 < words.len() {
            self.word += 1;
            self.ch = 0;
        }
    }

    pub fn prev_char(&mut self, words: &[String]) {
        if self.ch > 0 {
            self.ch -= 1;
        } else if self.word > 0 {
            self.word -= 1;
            self.ch = char_len(words, self.word).saturating_sub(1);
        }
    }

    pub fn next_word(&mut self, words: &[String]) {
        if self.word + 1 < words.len() {
            self.word += 1;
            self.clamp_char(words);
        }
    }

    pub fn prev_word(&mut self, words: &[String]) {
        if self.word > 0 {
            self.word -= 1;
            self.clamp_char(words);
        }
    }

    fn clamp_char(&mut self, words: &[String]) {
        self.ch = self.ch.min(char_len(words, self.word).saturating_sub(1));
    }
}

fn char_len(words: &[String], idx: usize) -> usize {
    words.get(idx).map(|w| w.chars().count()).unwrap_or(0)
}
