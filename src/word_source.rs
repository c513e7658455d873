use std::fmt;

use include_dir::{include_dir, Dir};
use itertools::Itertools;
use serde::Deserialize;

use crate::error::WordBankError;

static BANK_DIR: Dir = include_dir!("src/bank");

/// School year a set of blocks belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub struct GroupId(pub u8);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Groep {}", self.0)
    }
}

/// A named, ordered block of words
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Chapter {
    pub id: u32,
    pub method: String,
    pub name: String,
    pub words: Vec<String>,
}

impl Chapter {
    pub fn title(&self) -> String {
        format!("{} · {}", self.method, self.name)
    }
}

/// Read-only lookup of word lists
pub trait WordSource {
    fn list_groups(&self) -> Vec<GroupId>;
    fn words_for_group(&self, group: GroupId) -> Vec<Chapter>;

    fn find_block(&self, group: GroupId, block_id: u32) -> Option<Chapter> {
        self.words_for_group(group)
            .into_iter()
            .find(|c| c.id == block_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct GroupFile {
    group: GroupId,
    blocks: Vec<Chapter>,
}

/// Word tables compiled into the binary
#[derive(Debug, Clone, Default)]
pub struct WordBank {
    groups: Vec<(GroupId, Vec<Chapter>)>,
}

impl WordBank {
    /// Load every group file shipped in `src/bank`
    pub fn embedded() -> Result<Self, WordBankError> {
        let files = BANK_DIR
            .files()
            .filter(|f| f.path().extension().is_some_and(|ext| ext == "json"))
            .map(|f| {
                let name = f.path().display().to_string();
                let text = f
                    .contents_utf8()
                    .ok_or_else(|| WordBankError::Missing(name.clone()))?;
                parse_group(&name, text)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_groups(
            files.into_iter().map(|g| (g.group, g.blocks)),
        ))
    }

    pub fn from_groups(groups: impl IntoIterator<Item = (GroupId, Vec<Chapter>)>) -> Self {
        let groups = groups
            .into_iter()
            .sorted_by_key(|(id, _)| *id)
            .collect();
        Self { groups }
    }

    /// Plain-text listing used by `--list`
    pub fn render_listing(&self) -> String {
        self.groups
            .iter()
            .map(|(group, blocks)| {
                let lines = blocks
                    .iter()
                    .map(|b| format!("  [{}] {}: {}", b.id, b.title(), b.words.iter().join(", ")))
                    .join("\n");
                format!("{group}\n{lines}")
            })
            .join("\n\n")
    }
}

fn parse_group(name: &str, text: &str) -> Result<GroupFile, WordBankError> {
    serde_json::from_str(text).map_err(|source| WordBankError::Parse {
        file: name.to_string(),
        source,
    })
}

impl WordSource for WordBank {
    fn list_groups(&self) -> Vec<GroupId> {
        self.groups.iter().map(|(id, _)| *id).collect()
    }

    fn words_for_group(&self, group: GroupId) -> Vec<Chapter> {
        self.groups
            .iter()
            .find(|(id, _)| *id == group)
            .map(|(_, blocks)| blocks.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_bank_lists_groups_in_order() {
        let bank = WordBank::embedded().unwrap();
        assert_eq!(
            bank.list_groups(),
            vec![GroupId(3), GroupId(4), GroupId(5), GroupId(6)]
        );
    }

    #[test]
    fn blocks_keep_word_order() {
        let bank = WordBank::embedded().unwrap();
        let blocks = bank.words_for_group(GroupId(3));

        assert_eq!(blocks[0].id, 101);
        assert_eq!(blocks[0].words, vec!["ik", "maan", "vis", "roos", "sok"]);
        assert_eq!(blocks[0].title(), "Lijn 3 · Thema 1: De nieuwe groep");
    }

    #[test]
    fn unknown_group_has_no_blocks() {
        let bank = WordBank::embedded().unwrap();
        assert!(bank.words_for_group(GroupId(8)).is_empty());
        assert!(bank.find_block(GroupId(4), 101).is_none());
    }

    #[test]
    fn find_block_by_id() {
        let bank = WordBank::embedded().unwrap();
        let block = bank.find_block(GroupId(5), 304).unwrap();
        assert_eq!(block.words, vec!["knieën", "zeeën"]);
    }

    #[test]
    fn group_file_parse_error_names_file() {
        let err = parse_group("broken.json", "{ \"group\": 3 ").unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn listing_mentions_every_group() {
        let bank = WordBank::from_groups(vec![(
            GroupId(7),
            vec![Chapter {
                id: 1,
                method: "Test".into(),
                name: "Blok A".into(),
                words: vec!["een".into(), "twee".into()],
            }],
        )]);
        assert_eq!(bank.render_listing(), "Groep 7\n  [1] Test · Blok A: een, twee");
    }
}
