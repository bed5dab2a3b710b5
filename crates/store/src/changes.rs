use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};

/// One run of characters in a character-level diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffChunk {
    pub tag: ChunkTag,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkTag {
    Equal,
    Delete,
    Insert,
}

impl From<ChangeTag> for ChunkTag {
    fn from(tag: ChangeTag) -> Self {
        match tag {
            ChangeTag::Equal => Self::Equal,
            ChangeTag::Delete => Self::Delete,
            ChangeTag::Insert => Self::Insert,
        }
    }
}

/// Character-level diff between two human-readable value renderings.
///
/// Adjacent characters with the same tag are coalesced into runs. Two
/// empty strings produce an empty diff.
pub fn char_diff(old: &str, new: &str) -> Vec<DiffChunk> {
    if old.is_empty() && new.is_empty() {
        return Vec::new();
    }

    let diff = TextDiff::from_chars(old, new);
    let mut chunks: Vec<DiffChunk> = Vec::new();
    for change in diff.iter_all_changes() {
        let tag = ChunkTag::from(change.tag());
        match chunks.last_mut() {
            Some(last) if last.tag == tag => last.text.push_str(change.value()),
            _ => chunks.push(DiffChunk {
                tag,
                text: change.value().to_string(),
            }),
        }
    }
    chunks
}

/// Reconstruct the new string from a stored diff. Equal and inserted
/// runs concatenate to the rhs; deleted runs are dropped.
pub fn apply_chunks(chunks: &[DiffChunk]) -> String {
    chunks
        .iter()
        .filter(|c| c.tag != ChunkTag::Delete)
        .map(|c| c.text.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_inputs_empty_diff() {
        assert!(char_diff("", "").is_empty());
    }

    #[test]
    fn identical_strings_single_equal_run() {
        let chunks = char_diff("abc", "abc");
        assert_eq!(
            chunks,
            vec![DiffChunk {
                tag: ChunkTag::Equal,
                text: "abc".to_string(),
            }]
        );
    }

    #[test]
    fn runs_are_coalesced() {
        let chunks = char_diff("aaa", "bbb");
        // Whatever the run order, no two adjacent chunks share a tag.
        for pair in chunks.windows(2) {
            assert_ne!(pair[0].tag, pair[1].tag);
        }
    }

    #[test]
    fn roundtrip_reproduces_rhs() {
        let cases = [
            ("kittens", "sitting"),
            ("", "created"),
            ("removed", ""),
            ("same", "same"),
            ("42", "43"),
        ];
        for (old, new) in cases {
            let chunks = char_diff(old, new);
            assert_eq!(apply_chunks(&chunks), new, "diff of {old:?} -> {new:?}");
        }
    }

    #[test]
    fn serialized_form_is_stable() {
        let chunks = char_diff("a", "b");
        let json = serde_json::to_string(&chunks).unwrap();
        let back: Vec<DiffChunk> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, chunks);
    }
}
