//! Containers edited directly by the learner rather than animated.
//!
//! Each edit either applies completely and reports what happened, or fails
//! and leaves the container as it was.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use algoscope_steps::input;

use crate::catalog::Visualization;
use crate::error::{Error, Result};

/// Capacity of the stack and queue visualizations.
pub const STRUCTURE_CAPACITY: usize = 8;

/// Capacity of the list, linked list and dictionary visualizations.
pub const LIST_CAPACITY: usize = 12;

/// A bounded container and its contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Structure {
    /// Bottom first
    Stack { items: Vec<i64> },
    /// Front first
    Queue { items: VecDeque<i64> },
    /// Head first
    LinkedList { nodes: VecDeque<i64> },
    List { items: Vec<i64> },
    /// Insertion order; setting an existing key keeps its place
    Dict { entries: Vec<(String, String)> },
}

/// One learner edit, as sent by the frontend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StructureEdit {
    /// Push, enqueue, or append
    Push { value: String },
    /// Pop, dequeue, or pop from the end
    Pop,
    Insert { index: String, value: String },
    AddHead { value: String },
    AddTail { value: String },
    RemoveHead,
    RemoveTail,
    Set { key: String, value: String },
    Delete { key: String },
}

impl StructureEdit {
    fn name(&self) -> &'static str {
        match self {
            StructureEdit::Push { .. } => "push",
            StructureEdit::Pop => "pop",
            StructureEdit::Insert { .. } => "insert",
            StructureEdit::AddHead { .. } => "add_head",
            StructureEdit::AddTail { .. } => "add_tail",
            StructureEdit::RemoveHead => "remove_head",
            StructureEdit::RemoveTail => "remove_tail",
            StructureEdit::Set { .. } => "set",
            StructureEdit::Delete { .. } => "delete",
        }
    }
}

/// What an edit did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edited {
    pub message: String,
    /// Position of the element just added or changed
    pub focus: Option<usize>,
}

impl Edited {
    fn at(message: String, focus: usize) -> Self {
        Self {
            message,
            focus: Some(focus),
        }
    }

    fn removed(message: String) -> Self {
        Self { message, focus: None }
    }
}

impl Structure {
    /// Starting contents for a container visualization.
    pub fn for_visualization(visualization: Visualization) -> Option<Self> {
        use Visualization as V;
        Some(match visualization {
            V::Stack => Structure::Stack { items: vec![10, 25, 5] },
            V::Queue => Structure::Queue {
                items: VecDeque::from([10, 25, 5]),
            },
            V::LinkedList => Structure::LinkedList {
                nodes: VecDeque::from([12, 99, 37]),
            },
            V::PythonList => Structure::List {
                items: vec![10, 20, 30, 40],
            },
            V::PythonDict => Structure::Dict {
                entries: vec![
                    ("name".to_string(), "Alice".to_string()),
                    ("age".to_string(), "30".to_string()),
                ],
            },
            _ => return None,
        })
    }

    fn name(&self) -> &'static str {
        match self {
            Structure::Stack { .. } => "Stack",
            Structure::Queue { .. } => "Queue",
            Structure::LinkedList { .. } | Structure::List { .. } => "List",
            Structure::Dict { .. } => "Dictionary",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Structure::Stack { items } | Structure::List { items } => items.len(),
            Structure::Queue { items } => items.len(),
            Structure::LinkedList { nodes } => nodes.len(),
            Structure::Dict { entries } => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        match self {
            Structure::Stack { .. } | Structure::Queue { .. } => STRUCTURE_CAPACITY,
            _ => LIST_CAPACITY,
        }
    }

    /// Apply one edit.
    pub fn apply(&mut self, edit: StructureEdit) -> Result<Edited> {
        let name = self.name();
        let capacity = self.capacity();
        let full = self.len() >= capacity;
        let op = edit.name();
        let room = || -> Result<()> {
            if full {
                Err(algoscope_steps::Error::invalid(format!("{name} is full ({capacity} items).")).into())
            } else {
                Ok(())
            }
        };
        let empty = || -> Error { algoscope_steps::Error::not_applicable(format!("{name} is empty.")).into() };

        match (self, edit) {
            (Structure::Stack { items }, StructureEdit::Push { value }) => {
                let value = input::parse_integer("Value", &value)?;
                room()?;
                items.push(value);
                Ok(Edited::at(format!("Pushed {value}."), items.len() - 1))
            }
            (Structure::Stack { items }, StructureEdit::Pop) => {
                let value = items.pop().ok_or_else(empty)?;
                Ok(Edited::removed(format!("Popped {value}.")))
            }
            (Structure::Queue { items }, StructureEdit::Push { value }) => {
                let value = input::parse_integer("Value", &value)?;
                room()?;
                items.push_back(value);
                Ok(Edited::at(format!("Enqueued {value}."), items.len() - 1))
            }
            (Structure::Queue { items }, StructureEdit::Pop) => {
                let value = items.pop_front().ok_or_else(empty)?;
                Ok(Edited::removed(format!("Dequeued {value}.")))
            }
            (Structure::LinkedList { nodes }, StructureEdit::AddHead { value }) => {
                let value = input::parse_integer("Value", &value)?;
                room()?;
                nodes.push_front(value);
                Ok(Edited::at(format!("Added {value} at head."), 0))
            }
            (Structure::LinkedList { nodes }, StructureEdit::AddTail { value }) => {
                let value = input::parse_integer("Value", &value)?;
                room()?;
                nodes.push_back(value);
                Ok(Edited::at(format!("Added {value} at tail."), nodes.len() - 1))
            }
            (Structure::LinkedList { nodes }, StructureEdit::RemoveHead) => {
                let value = nodes.pop_front().ok_or_else(empty)?;
                Ok(Edited::removed(format!("Removed {value} from head.")))
            }
            (Structure::LinkedList { nodes }, StructureEdit::RemoveTail) => {
                let value = nodes.pop_back().ok_or_else(empty)?;
                Ok(Edited::removed(format!("Removed {value} from tail.")))
            }
            (Structure::List { items }, StructureEdit::Push { value }) => {
                let value = input::parse_integer("Value", &value)?;
                room()?;
                items.push(value);
                Ok(Edited::at(format!("list.append({value})"), items.len() - 1))
            }
            (Structure::List { items }, StructureEdit::Insert { index, value }) => {
                let value = input::parse_integer("Value", &value)?;
                let index = input::parse_integer("Index", &index)?;
                let at = usize::try_from(index)
                    .ok()
                    .filter(|&at| at <= items.len())
                    .ok_or_else(|| algoscope_steps::Error::invalid("Index out of bounds."))?;
                room()?;
                items.insert(at, value);
                Ok(Edited::at(format!("list.insert({at}, {value})"), at))
            }
            (Structure::List { items }, StructureEdit::Pop) => {
                let value = items.pop().ok_or_else(empty)?;
                Ok(Edited::removed(format!("list.pop() -> returned {value}")))
            }
            (Structure::Dict { entries }, StructureEdit::Set { key, value }) => {
                let (key, value) = (key.trim().to_string(), value.trim().to_string());
                if key.is_empty() || value.is_empty() {
                    return Err(algoscope_steps::Error::invalid("Key and value cannot be empty.").into());
                }
                let message = format!("dict['{key}'] = '{value}'");
                match entries.iter().position(|(k, _)| *k == key) {
                    Some(at) => {
                        entries[at].1 = value;
                        Ok(Edited::at(message, at))
                    }
                    None => {
                        room()?;
                        entries.push((key, value));
                        Ok(Edited::at(message, entries.len() - 1))
                    }
                }
            }
            (Structure::Dict { entries }, StructureEdit::Delete { key }) => {
                let key = key.trim();
                if key.is_empty() {
                    return Err(algoscope_steps::Error::invalid("Key cannot be empty.").into());
                }
                let at = entries
                    .iter()
                    .position(|(k, _)| k == key)
                    .ok_or_else(|| algoscope_steps::Error::not_applicable(format!("KeyError: '{key}' not found")))?;
                entries.remove(at);
                Ok(Edited::removed(format!("del dict['{key}']")))
            }
            _ => Err(Error::Unsupported(format!("{name} does not support {op}."))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn structure(visualization: Visualization) -> Structure {
        Structure::for_visualization(visualization).unwrap()
    }

    fn push(value: &str) -> StructureEdit {
        StructureEdit::Push { value: value.into() }
    }

    fn is_not_applicable(result: Result<Edited>) -> bool {
        matches!(result, Err(Error::Input(algoscope_steps::Error::NotApplicable(_))))
    }

    fn is_invalid(result: Result<Edited>) -> bool {
        matches!(result, Err(Error::Input(algoscope_steps::Error::InvalidInput(_))))
    }

    #[test]
    fn only_container_topics_have_structures() {
        assert!(Structure::for_visualization(Visualization::BubbleSort).is_none());
        assert_eq!(structure(Visualization::PythonList).len(), 4);
        assert_eq!(structure(Visualization::PythonDict).len(), 2);
    }

    #[test]
    fn stack_is_lifo_and_bounded() {
        let mut s = structure(Visualization::Stack);
        assert!(is_invalid(s.apply(push("abc"))));
        for v in 0..5 {
            s.apply(push(&v.to_string())).unwrap();
        }
        assert!(is_invalid(s.apply(push("9"))));
        assert_eq!(s.apply(StructureEdit::Pop).unwrap().message, "Popped 4.");
    }

    #[test]
    fn queue_is_fifo() {
        let mut s = structure(Visualization::Queue);
        let edited = s.apply(push("7")).unwrap();
        assert_eq!(edited, Edited::at("Enqueued 7.".into(), 3));
        assert_eq!(s.apply(StructureEdit::Pop).unwrap().message, "Dequeued 10.");
    }

    #[test]
    fn linked_list_edits_both_ends() {
        let mut s = structure(Visualization::LinkedList);
        assert_eq!(
            s.apply(StructureEdit::AddHead { value: "1".into() }).unwrap(),
            Edited::at("Added 1 at head.".into(), 0)
        );
        assert_eq!(
            s.apply(StructureEdit::AddTail { value: "2".into() }).unwrap(),
            Edited::at("Added 2 at tail.".into(), 4)
        );
        assert_eq!(s, Structure::LinkedList { nodes: VecDeque::from([1, 12, 99, 37, 2]) });

        assert_eq!(s.apply(StructureEdit::RemoveHead).unwrap().message, "Removed 1 from head.");
        assert_eq!(s.apply(StructureEdit::RemoveTail).unwrap().message, "Removed 2 from tail.");
        assert_eq!(s, Structure::LinkedList { nodes: VecDeque::from([12, 99, 37]) });
    }

    #[test]
    fn linked_list_single_node_and_empty() {
        let mut s = Structure::LinkedList { nodes: VecDeque::from([5]) };
        assert_eq!(s.apply(StructureEdit::RemoveTail).unwrap().message, "Removed 5 from tail.");
        assert!(s.is_empty());
        assert!(is_not_applicable(s.apply(StructureEdit::RemoveHead)));
        assert!(is_not_applicable(s.apply(StructureEdit::RemoveTail)));

        s.apply(StructureEdit::AddTail { value: "8".into() }).unwrap();
        assert_eq!(s, Structure::LinkedList { nodes: VecDeque::from([8]) });
    }

    #[test]
    fn list_append_insert_pop() {
        let mut s = structure(Visualization::PythonList);
        assert_eq!(s.apply(push("50")).unwrap().message, "list.append(50)");
        let edited = s
            .apply(StructureEdit::Insert { index: "0".into(), value: "5".into() })
            .unwrap();
        assert_eq!(edited, Edited::at("list.insert(0, 5)".into(), 0));
        s.apply(StructureEdit::Insert { index: "6".into(), value: "60".into() })
            .unwrap();
        assert_eq!(s, Structure::List { items: vec![5, 10, 20, 30, 40, 50, 60] });

        assert_eq!(s.apply(StructureEdit::Pop).unwrap().message, "list.pop() -> returned 60");
    }

    #[test]
    fn list_insert_bounds_checked() {
        let mut s = structure(Visualization::PythonList);
        let before = s.clone();
        assert!(is_invalid(s.apply(StructureEdit::Insert { index: "5".into(), value: "1".into() })));
        assert!(is_invalid(s.apply(StructureEdit::Insert { index: "-1".into(), value: "1".into() })));
        assert!(is_invalid(s.apply(StructureEdit::Insert { index: "x".into(), value: "1".into() })));
        assert_eq!(s, before);
    }

    #[test]
    fn empty_list_pop_rejected() {
        let mut s = Structure::List { items: Vec::new() };
        let err = s.apply(StructureEdit::Pop).unwrap_err();
        assert_eq!(err.to_string(), "List is empty.");
    }

    #[test]
    fn dict_set_and_delete() {
        let mut s = structure(Visualization::PythonDict);
        assert_eq!(
            s.apply(StructureEdit::Set { key: "age".into(), value: "31".into() }).unwrap(),
            Edited::at("dict['age'] = '31'".into(), 1)
        );
        assert_eq!(
            s.apply(StructureEdit::Set { key: "city".into(), value: "Paris".into() }).unwrap(),
            Edited::at("dict['city'] = 'Paris'".into(), 2)
        );
        assert_eq!(
            s.apply(StructureEdit::Delete { key: "name".into() }).unwrap().message,
            "del dict['name']"
        );
        assert_eq!(
            s,
            Structure::Dict {
                entries: vec![("age".into(), "31".into()), ("city".into(), "Paris".into())]
            }
        );
    }

    #[test]
    fn dict_missing_key_is_key_error() {
        let mut s = structure(Visualization::PythonDict);
        let err = s.apply(StructureEdit::Delete { key: "zip".into() }).unwrap_err();
        assert!(matches!(err, Error::Input(algoscope_steps::Error::NotApplicable(_))));
        assert_eq!(err.to_string(), "KeyError: 'zip' not found");
        assert!(is_invalid(s.apply(StructureEdit::Set { key: " ".into(), value: "v".into() })));
        assert!(is_invalid(s.apply(StructureEdit::Delete { key: String::new() })));
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn wrong_edit_for_container_is_unsupported() {
        let mut s = structure(Visualization::Stack);
        assert!(matches!(s.apply(StructureEdit::RemoveHead), Err(Error::Unsupported(_))));
        let mut d = structure(Visualization::PythonDict);
        assert!(matches!(d.apply(StructureEdit::Pop), Err(Error::Unsupported(_))));
    }
}
