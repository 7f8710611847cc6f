//! Arena-backed trie over lowercase ASCII words.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Index of the root node.
pub const ROOT: usize = 0;

/// A trie node. Children are kept in alphabetical order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrieNode {
    pub letter: Option<char>,
    pub children: BTreeMap<char, usize>,
    /// A word ends here
    pub terminal: bool,
}

/// Prefix tree with nodes stored in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trie {
    nodes: Vec<TrieNode>,
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

impl Trie {
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
        }
    }

    /// Build a trie by inserting each word directly.
    pub fn with_words<'a>(words: impl IntoIterator<Item = &'a str>) -> Self {
        let mut trie = Self::new();
        for word in words {
            trie.insert(word);
        }
        trie
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when no word has been inserted.
    pub fn is_empty(&self) -> bool {
        !self.nodes.iter().any(|n| n.terminal)
    }

    pub fn node(&self, id: usize) -> Option<&TrieNode> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &[TrieNode] {
        &self.nodes
    }

    pub fn child(&self, id: usize, letter: char) -> Option<usize> {
        self.nodes.get(id)?.children.get(&letter).copied()
    }

    /// Create a child of `parent` for `letter` and return its id.
    ///
    /// Returns `None` if `parent` does not exist or already has that child.
    pub fn attach(&mut self, parent: usize, letter: char) -> Option<usize> {
        let id = self.nodes.len();
        let slot = self.nodes.get_mut(parent)?;
        if slot.children.contains_key(&letter) {
            return None;
        }
        slot.children.insert(letter, id);
        self.nodes.push(TrieNode {
            letter: Some(letter),
            ..TrieNode::default()
        });
        Some(id)
    }

    /// Flag `id` as the end of a word. Returns false for unknown ids.
    pub fn mark_word(&mut self, id: usize) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.terminal = true;
                true
            }
            None => false,
        }
    }

    pub fn insert(&mut self, word: &str) {
        let mut at = ROOT;
        for letter in word.chars() {
            at = match self.child(at, letter) {
                Some(next) => next,
                None => match self.attach(at, letter) {
                    Some(next) => next,
                    None => return,
                },
            };
        }
        self.mark_word(at);
    }

    /// Node reached by walking `prefix`, if any.
    pub fn find(&self, prefix: &str) -> Option<usize> {
        prefix.chars().try_fold(ROOT, |at, letter| self.child(at, letter))
    }

    pub fn contains(&self, word: &str) -> bool {
        self.find(word)
            .and_then(|id| self.node(id))
            .is_some_and(|n| n.terminal)
    }

    /// Every stored word, alphabetically.
    pub fn words(&self) -> Vec<String> {
        let mut words = Vec::new();
        let mut pending = vec![(ROOT, String::new())];
        while let Some((id, prefix)) = pending.pop() {
            let Some(node) = self.node(id) else { continue };
            if node.terminal {
                words.push(prefix.clone());
            }
            for (&letter, &child) in node.children.iter().rev() {
                let mut next = prefix.clone();
                next.push(letter);
                pending.push((child, next));
            }
        }
        words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_shares_prefixes() {
        let trie = Trie::with_words(["car", "cat", "cart"]);
        // root + c + a + r + t(cat) + t(cart)
        assert_eq!(trie.len(), 6);
        assert!(trie.contains("car"));
        assert!(trie.contains("cart"));
        assert!(!trie.contains("ca"));
    }

    #[test]
    fn words_are_alphabetical() {
        let trie = Trie::with_words(["dog", "cat", "do", "car"]);
        assert_eq!(trie.words(), vec!["car", "cat", "do", "dog"]);
    }

    #[test]
    fn empty_means_no_words() {
        assert!(Trie::new().is_empty());
        assert!(!Trie::with_words(["a"]).is_empty());
    }

    #[test]
    fn attach_refuses_duplicates() {
        let mut trie = Trie::new();
        assert_eq!(trie.attach(ROOT, 'a'), Some(1));
        assert_eq!(trie.attach(ROOT, 'a'), None);
        assert_eq!(trie.attach(42, 'b'), None);
    }
}
