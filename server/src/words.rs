use anyhow::{Context, bail};
use rand::seq::SliceRandom;
use std::path::Path;

/// Fallback vocabulary used when no words file is configured.
const BUILTIN_WORDS: &[&str] = &[
    "airplane", "anchor", "apple", "balloon", "banana", "bridge", "broom", "butterfly", "cactus",
    "camera", "candle", "carrot", "castle", "caterpillar", "church", "cloud", "compass", "crown",
    "diamond", "dolphin", "dragon", "drum", "elephant", "envelope", "feather", "fireplace",
    "flashlight", "fountain", "giraffe", "guitar", "hammer", "hedgehog", "helicopter", "igloo",
    "island", "kangaroo", "kettle", "ladder", "lighthouse", "magnet", "mermaid", "microscope",
    "mountain", "mushroom", "octopus", "owl", "palette", "parachute", "penguin", "pineapple",
    "pyramid", "rainbow", "robot", "rocket", "sandcastle", "scarecrow", "scissors", "snowman",
    "spider", "submarine", "suitcase", "telescope", "tornado", "tractor", "trumpet", "turtle",
    "umbrella", "unicorn", "volcano", "waterfall", "whale", "windmill", "wizard", "zebra",
];

/// The fixed vocabulary words are drawn from. A vocabulary smaller than the
/// per-turn choice count is a configuration error caught at startup.
pub struct WordList {
    words: Vec<String>,
}

impl WordList {
    pub fn new(words: Vec<String>, min_len: usize) -> anyhow::Result<Self> {
        let words: Vec<String> = words
            .into_iter()
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        if words.len() < min_len {
            bail!(
                "vocabulary has {} words but at least {} are required per turn",
                words.len(),
                min_len
            );
        }
        Ok(Self { words })
    }

    pub fn builtin(min_len: usize) -> anyhow::Result<Self> {
        Self::new(BUILTIN_WORDS.iter().map(|w| w.to_string()).collect(), min_len)
    }

    /// Load a newline-separated words file.
    pub async fn load(path: impl AsRef<Path>, min_len: usize) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read words file: {}", path.display()))?;
        Self::new(content.lines().map(str::to_string).collect(), min_len)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Draw `n` distinct words uniformly at random. `n` is validated against
    /// the vocabulary size at construction time.
    pub fn pick(&self, n: usize) -> Vec<String> {
        self.words
            .choose_multiple(&mut rand::thread_rng(), n)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn pick_returns_distinct_words() {
        let list = WordList::builtin(9).unwrap();
        for _ in 0..50 {
            let picked = list.pick(9);
            assert_eq!(picked.len(), 9);
            let unique: HashSet<_> = picked.iter().collect();
            assert_eq!(unique.len(), 9);
        }
    }

    #[test]
    fn too_small_vocabulary_fails_at_construction() {
        let words = vec!["one".to_string(), "two".to_string()];
        assert!(WordList::new(words, 9).is_err());
    }

    #[test]
    fn blank_lines_are_dropped() {
        let words = vec!["a".to_string(), "".to_string(), "  ".to_string(), "b".to_string()];
        let list = WordList::new(words, 2).unwrap();
        assert_eq!(list.len(), 2);
    }
}
