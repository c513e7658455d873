use crate::builder::build_config;
use crate::error::BuildError;
use crate::session::{DisplayDuration, WordConfig};
use crate::word_source::{Chapter, GroupId, WordSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupField {
    Group,
    Block,
    Words,
    Speed,
    Topic,
    Start,
}

impl SetupField {
    const ORDER: [SetupField; 6] = [
        SetupField::Group,
        SetupField::Block,
        SetupField::Words,
        SetupField::Speed,
        SetupField::Topic,
        SetupField::Start,
    ];

    fn offset(self, by: isize) -> Self {
        let len = Self::ORDER.len() as isize;
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0) as isize;
        Self::ORDER[(idx + by).rem_euclid(len) as usize]
    }

    /// Fields that accept typed characters
    pub fn is_text(self) -> bool {
        matches!(self, SetupField::Words | SetupField::Topic)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Error(String),
    Info(String),
}

/// Form state of the setup screen
#[derive(Debug, Clone)]
pub struct SetupState {
    pub groups: Vec<GroupId>,
    pub group: Option<usize>,
    pub blocks: Vec<Chapter>,
    pub block: Option<usize>,
    pub text: String,
    pub duration: DisplayDuration,
    pub topic: String,
    pub focus: SetupField,
    pub notice: Option<Notice>,
    pub generating: bool,
}

impl SetupState {
    pub fn new(source: &dyn WordSource, duration: DisplayDuration) -> Self {
        Self {
            groups: source.list_groups(),
            group: None,
            blocks: Vec::new(),
            block: None,
            text: String::new(),
            duration,
            topic: String::new(),
            focus: SetupField::Group,
            notice: None,
            generating: false,
        }
    }

    pub fn selected_group(&self) -> Option<GroupId> {
        self.group.and_then(|i| self.groups.get(i).copied())
    }

    pub fn selected_block(&self) -> Option<&Chapter> {
        self.block.and_then(|i| self.blocks.get(i))
    }

    /// Picking a group drops the block choice and the loaded words
    pub fn select_group(&mut self, source: &dyn WordSource, group: GroupId) -> bool {
        let Some(idx) = self.groups.iter().position(|g| *g == group) else {
            return false;
        };
        self.group = Some(idx);
        self.blocks = source.words_for_group(group);
        self.block = None;
        self.text.clear();
        true
    }

    pub fn cycle_group(&mut self, source: &dyn WordSource, forward: bool) {
        if self.groups.is_empty() {
            return;
        }
        let idx = cycle_index(self.group, self.groups.len(), forward);
        let group = self.groups[idx];
        self.select_group(source, group);
    }

    /// Load a block's words into the editor, one per line
    pub fn select_block(&mut self, block_id: u32) -> bool {
        let Some(idx) = self.blocks.iter().position(|b| b.id == block_id) else {
            return false;
        };
        self.block = Some(idx);
        self.text = self.blocks[idx].words.join("\n");
        self.notice = None;
        true
    }

    pub fn cycle_block(&mut self, forward: bool) {
        if self.blocks.is_empty() {
            return;
        }
        let idx = cycle_index(self.block, self.blocks.len(), forward);
        let id = self.blocks[idx].id;
        self.select_block(id);
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.offset(1);
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.offset(-1);
    }

    /// Editing the words by hand detaches them from the selected block
    pub fn insert_char(&mut self, c: char) {
        match self.focus {
            SetupField::Words => {
                self.text.push(c);
                self.block = None;
            }
            SetupField::Topic => self.topic.push(c),
            _ => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            SetupField::Words => {
                self.text.pop();
                self.block = None;
            }
            SetupField::Topic => {
                self.topic.pop();
            }
            _ => {}
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.block = None;
    }

    /// Replace the editor contents with generated words
    pub fn apply_suggestions(&mut self, words: &[String]) {
        self.set_text(words.join("\n"));
        self.generating = false;
        self.notice = Some(Notice::Info(format!("{} woorden gegenereerd.", words.len())));
    }

    pub fn build(&self) -> Result<WordConfig, BuildError> {
        build_config(&self.text, self.duration)
    }
}

fn cycle_index(current: Option<usize>, len: usize, forward: bool) -> usize {
    match (current, forward) {
        (None, true) => 0,
        (None, false) => len - 1,
        (Some(i), true) => (i + 1) % len,
        (Some(i), false) => (i + len - 1) % len,
    }
}
