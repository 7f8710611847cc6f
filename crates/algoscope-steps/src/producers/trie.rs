//! Trie insertion and prefix search.

use crate::error::Fault;
use crate::producer::StepProducer;
use crate::step::{Growth, Outcome, Patch, Step, TrieStep};
use crate::trie::{Trie, ROOT};

#[derive(Debug, Clone, Copy)]
enum InsertPhase {
    Start,
    Walk,
    MarkEnd,
    Finish,
    Done,
}

/// Insert one word, one character per step.
///
/// Works on a private copy; the folded state carries the grown trie.
pub struct TrieInsert {
    trie: Trie,
    word: String,
    letters: Vec<char>,
    depth: usize,
    path: Vec<usize>,
    phase: InsertPhase,
}

impl TrieInsert {
    pub fn new(trie: Trie, word: impl Into<String>) -> Self {
        let word = word.into();
        Self {
            trie,
            letters: word.chars().collect(),
            word,
            depth: 0,
            path: vec![ROOT],
            phase: InsertPhase::Start,
        }
    }

    fn at(&self) -> usize {
        self.path.last().copied().unwrap_or(ROOT)
    }
}

impl StepProducer for TrieInsert {
    fn name(&self) -> &'static str {
        "trie_insert"
    }

    fn advance(&mut self) -> Result<Option<Step>, Fault> {
        let step = match self.phase {
            InsertPhase::Start => {
                self.phase = InsertPhase::Walk;
                TrieStep {
                    cursor: Patch::Set(ROOT),
                    path: Some(self.path.clone()),
                    note: Some(format!("Inserting \"{}\" from the root.", self.word)),
                    ..TrieStep::default()
                }
            }
            InsertPhase::Walk => {
                let Some(&letter) = self.letters.get(self.depth) else {
                    self.phase = InsertPhase::MarkEnd;
                    return self.advance();
                };
                let at = self.at();
                self.depth += 1;
                match self.trie.child(at, letter) {
                    Some(next) => {
                        self.path.push(next);
                        TrieStep {
                            cursor: Patch::Set(next),
                            path: Some(self.path.clone()),
                            note: Some(format!("'{letter}' already exists, moving down.")),
                            ..TrieStep::default()
                        }
                    }
                    None => {
                        let node = self.trie.attach(at, letter).ok_or(Fault::UnknownTrieNode(at))?;
                        self.path.push(node);
                        TrieStep {
                            grow: Some(Growth { parent: at, letter, node }),
                            cursor: Patch::Set(node),
                            path: Some(self.path.clone()),
                            note: Some(format!("Created a node for '{letter}'.")),
                            ..TrieStep::default()
                        }
                    }
                }
            }
            InsertPhase::MarkEnd => {
                let at = self.at();
                self.trie.mark_word(at);
                self.phase = InsertPhase::Finish;
                TrieStep {
                    word_end: Some(at),
                    note: Some(format!("Marked the end of \"{}\".", self.word)),
                    ..TrieStep::default()
                }
            }
            InsertPhase::Finish => {
                self.phase = InsertPhase::Done;
                return Ok(Some(Step::finished(Outcome::Inserted {
                    word: self.word.clone(),
                })));
            }
            InsertPhase::Done => return Ok(None),
        };
        Ok(Some(step.into()))
    }
}

#[derive(Debug, Clone)]
enum SearchPhase {
    Start,
    Walk,
    Collect,
    Finish(Outcome),
    Done,
}

/// Walk a prefix, then list every word below it in alphabetical order.
pub struct TrieSearch {
    trie: Trie,
    prefix: String,
    letters: Vec<char>,
    depth: usize,
    path: Vec<usize>,
    /// Explicit DFS stack of (node, word so far)
    pending: Vec<(usize, String)>,
    words: Vec<String>,
    phase: SearchPhase,
}

impl TrieSearch {
    pub fn new(trie: Trie, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            trie,
            letters: prefix.chars().collect(),
            prefix,
            depth: 0,
            path: vec![ROOT],
            pending: Vec::new(),
            words: Vec::new(),
            phase: SearchPhase::Start,
        }
    }
}

impl StepProducer for TrieSearch {
    fn name(&self) -> &'static str {
        "trie_search"
    }

    fn advance(&mut self) -> Result<Option<Step>, Fault> {
        let step = match std::mem::replace(&mut self.phase, SearchPhase::Done) {
            SearchPhase::Start => {
                self.phase = SearchPhase::Walk;
                TrieStep {
                    cursor: Patch::Set(ROOT),
                    path: Some(self.path.clone()),
                    note: Some(format!("Searching for prefix \"{}\".", self.prefix)),
                    ..TrieStep::default()
                }
            }
            SearchPhase::Walk => {
                let at = self.path.last().copied().unwrap_or(ROOT);
                let Some(&letter) = self.letters.get(self.depth) else {
                    self.pending.push((at, self.prefix.clone()));
                    self.phase = SearchPhase::Collect;
                    return self.advance();
                };
                self.depth += 1;
                match self.trie.child(at, letter) {
                    Some(next) => {
                        self.path.push(next);
                        self.phase = SearchPhase::Walk;
                        TrieStep {
                            cursor: Patch::Set(next),
                            path: Some(self.path.clone()),
                            note: Some(format!("Found '{letter}'.")),
                            ..TrieStep::default()
                        }
                    }
                    None => {
                        self.phase = SearchPhase::Finish(Outcome::PrefixMissing {
                            prefix: self.prefix.clone(),
                        });
                        TrieStep {
                            cursor: Patch::Clear,
                            note: Some(format!("No node for '{letter}'.")),
                            ..TrieStep::default()
                        }
                    }
                }
            }
            SearchPhase::Collect => match self.pending.pop() {
                Some((id, word)) => {
                    let node = self.trie.node(id).ok_or(Fault::UnknownTrieNode(id))?;
                    for (&letter, &child) in node.children.iter().rev() {
                        let mut next = word.clone();
                        next.push(letter);
                        self.pending.push((child, next));
                    }
                    let matched = node.terminal.then(|| word.clone());
                    if let Some(found) = &matched {
                        self.words.push(found.clone());
                    }
                    self.phase = SearchPhase::Collect;
                    let note = match &matched {
                        Some(found) => format!("\"{found}\" is a word."),
                        None => format!("Exploring \"{word}\"."),
                    };
                    TrieStep {
                        cursor: Patch::Set(id),
                        matched,
                        note: Some(note),
                        ..TrieStep::default()
                    }
                }
                None => {
                    self.phase = SearchPhase::Done;
                    return Ok(Some(Step::finished(Outcome::Matches {
                        prefix: self.prefix.clone(),
                        words: std::mem::take(&mut self.words),
                    })));
                }
            },
            SearchPhase::Finish(outcome) => return Ok(Some(Step::finished(outcome))),
            SearchPhase::Done => return Ok(None),
        };
        Ok(Some(step.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::producer::drain;
    use crate::state::{Scene, TrieState, VisualState};

    fn run(mut producer: impl StepProducer, trie: &Trie) -> VisualState {
        let steps = drain(&mut producer).unwrap();
        VisualState::fold(VisualState::new(Scene::Trie(TrieState::new(trie.clone()))), &steps).unwrap()
    }

    #[test]
    fn insert_grows_only_missing_nodes() {
        let trie = Trie::with_words(["car"]);
        let state = run(TrieInsert::new(trie.clone(), "cart"), &trie);
        let grown = &state.trie().unwrap().trie;
        assert_eq!(grown.len(), trie.len() + 1);
        assert!(grown.contains("cart"));
        assert!(grown.contains("car"));
        assert_eq!(state.outcome, Some(Outcome::Inserted { word: "cart".to_string() }));
        // caller's trie untouched
        assert!(!trie.contains("cart"));
    }

    #[test]
    fn insert_existing_word_adds_nothing() {
        let trie = Trie::with_words(["dog"]);
        let state = run(TrieInsert::new(trie.clone(), "dog"), &trie);
        assert_eq!(state.trie().unwrap().trie, trie);
    }

    #[test]
    fn search_lists_words_alphabetically() {
        let trie = Trie::with_words(["tea", "ten", "to", "ted", "inn"]);
        let state = run(TrieSearch::new(trie.clone(), "te"), &trie);
        assert_eq!(
            state.outcome,
            Some(Outcome::Matches {
                prefix: "te".to_string(),
                words: vec!["tea".to_string(), "ted".to_string(), "ten".to_string()],
            })
        );
        assert_eq!(state.trie().unwrap().matches, vec!["tea", "ted", "ten"]);
    }

    #[test]
    fn search_missing_prefix() {
        let trie = Trie::with_words(["tea"]);
        let state = run(TrieSearch::new(trie.clone(), "tx"), &trie);
        assert_eq!(state.outcome, Some(Outcome::PrefixMissing { prefix: "tx".to_string() }));
        assert_eq!(state.message.as_deref(), Some("No words start with \"tx\"."));
    }

    #[test]
    fn empty_prefix_matches_everything() {
        let trie = Trie::with_words(["b", "a"]);
        let state = run(TrieSearch::new(trie.clone(), ""), &trie);
        assert_eq!(
            state.outcome,
            Some(Outcome::Matches {
                prefix: String::new(),
                words: vec!["a".to_string(), "b".to_string()],
            })
        );
    }
}
