//! Topic catalog.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Which interactive visualization a topic opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visualization {
    /// Reading material only
    None,
    BubbleSort,
    SelectionSort,
    InsertionSort,
    MergeSort,
    QuickSort,
    HeapSort,
    LinearSearch,
    BinarySearch,
    BreadthFirstSearch,
    DepthFirstSearch,
    /// BFS or DFS, chosen by the learner
    GraphTraversal,
    Dijkstra,
    CoinChange,
    Knapsack,
    FibonacciMemoization,
    Recursion,
    Trie,
    Stack,
    Queue,
    LinkedList,
    PythonList,
    PythonDict,
}

impl Visualization {
    pub fn is_interactive(self) -> bool {
        self != Visualization::None
    }
}

/// A learning topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub title: String,
    pub category: String,
    pub visualization: Visualization,
}

impl Topic {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        category: impl Into<String>,
        visualization: Visualization,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            category: category.into(),
            visualization,
        }
    }

    /// Built-in topics.
    pub fn defaults() -> Vec<Self> {
        use Visualization as V;
        [
            ("time-complexity-big-o", "Time Complexity (Big-O, Ω, Θ)", "Basics & Complexity", V::None),
            ("space-complexity", "Space Complexity", "Basics & Complexity", V::None),
            ("prime-numbers-sieve-of-eratosthenes", "Prime Numbers (Sieve of Eratosthenes)", "Basics & Complexity", V::None),
            ("python-list", "Python Lists (Arrays)", "Arrays & Matrices", V::PythonList),
            ("prefix-sum-difference-array", "Prefix Sum / Difference Array", "Arrays & Matrices", V::None),
            ("sliding-window", "Sliding Window", "Arrays & Matrices", V::None),
            ("two-pointers-technique", "Two Pointers Technique", "Arrays & Matrices", V::None),
            ("binary-search", "Binary Search", "Searching Algorithms", V::BinarySearch),
            ("linear-search", "Linear Search", "Searching Algorithms", V::LinearSearch),
            ("bubble-sort", "Bubble Sort", "Sorting Algorithms", V::BubbleSort),
            ("counting-sort", "Counting Sort", "Sorting Algorithms", V::None),
            ("heap-sort", "Heap Sort", "Sorting Algorithms", V::HeapSort),
            ("insertion-sort", "Insertion Sort", "Sorting Algorithms", V::InsertionSort),
            ("merge-sort", "Merge Sort", "Sorting Algorithms", V::MergeSort),
            ("quick-sort", "Quick Sort", "Sorting Algorithms", V::QuickSort),
            ("radix-sort", "Radix Sort", "Sorting Algorithms", V::None),
            ("selection-sort", "Selection Sort", "Sorting Algorithms", V::SelectionSort),
            ("kmp-algorithm", "KMP Algorithm", "Strings", V::None),
            ("rabin-karp-algorithm", "Rabin-Karp Algorithm", "Strings", V::None),
            ("tries", "Tries (Prefix Tree)", "Strings", V::Trie),
            ("linked-lists", "Linked Lists", "Linked Lists", V::LinkedList),
            ("lru-cache", "LRU Cache", "Linked Lists", V::None),
            ("balanced-parentheses", "Balanced Parentheses", "Stacks & Queues", V::None),
            ("queues", "Queues", "Stacks & Queues", V::Queue),
            ("stacks", "Stacks", "Stacks & Queues", V::Stack),
            ("python-dict", "Python Dictionaries (Hash Tables)", "Hash Tables", V::PythonDict),
            ("binary-search-tree", "Binary Search Trees", "Trees", V::None),
            ("segment-tree", "Segment Tree", "Trees", V::None),
            ("heaps", "Heaps (Priority Queues)", "Heaps", V::None),
            ("bellman-ford-algorithm", "Bellman-Ford Algorithm", "Graphs", V::None),
            ("breadth-first-search-bfs", "Breadth First Search (BFS)", "Graphs", V::BreadthFirstSearch),
            ("depth-first-search-dfs", "Depth First Search (DFS)", "Graphs", V::DepthFirstSearch),
            ("dijkstras-algorithm", "Dijkstra’s Algorithm", "Graphs", V::Dijkstra),
            ("graphs", "Graphs", "Graphs", V::GraphTraversal),
            ("topological-sort", "Topological Sort", "Graphs", V::None),
            ("backtracking", "Backtracking", "Algorithmic Paradigms", V::None),
            ("coin-change-problem", "Coin Change Problem", "Algorithmic Paradigms", V::CoinChange),
            ("dynamic-programming", "Dynamic Programming", "Algorithmic Paradigms", V::FibonacciMemoization),
            ("greedy-algorithms", "Greedy Algorithms", "Algorithmic Paradigms", V::None),
            ("knapsack-problem", "Knapsack Problem", "Algorithmic Paradigms", V::Knapsack),
            ("recursion", "Recursion", "Algorithmic Paradigms", V::Recursion),
            ("disjoint-set-union-find", "Disjoint Set (Union-Find)", "Special Data Structures", V::None),
            ("bit-manipulation", "Bit Manipulation", "Advanced Topics", V::None),
        ]
        .into_iter()
        .map(|(id, title, category, vis)| Topic::new(id, title, category, vis))
        .collect()
    }
}

/// Process-wide topic registry.
pub struct Catalog {
    topics: RwLock<HashMap<String, Topic>>,
}

impl Catalog {
    pub fn new(topics: impl IntoIterator<Item = Topic>) -> Self {
        Self {
            topics: RwLock::new(topics.into_iter().map(|t| (t.id.clone(), t)).collect()),
        }
    }

    /// Catalog seeded with [`Topic::defaults`].
    pub fn with_defaults() -> Self {
        Self::new(Topic::defaults())
    }

    /// All topics, by category then title.
    pub async fn list(&self) -> Vec<Topic> {
        let mut topics: Vec<Topic> = self.topics.read().await.values().cloned().collect();
        topics.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.title.cmp(&b.title)));
        topics
    }

    pub async fn get(&self, id: &str) -> Option<Topic> {
        self.topics.read().await.get(id).cloned()
    }

    /// Insert or replace; last write wins.
    pub async fn upsert(&self, topic: Topic) {
        self.topics.write().await.insert(topic.id.clone(), topic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_not_empty() {
        let topics = Topic::defaults();
        assert!(!topics.is_empty());
        assert!(topics.iter().any(|t| t.visualization == Visualization::Dijkstra));
    }

    #[test]
    fn default_ids_unique() {
        let topics = Topic::defaults();
        let ids: std::collections::HashSet<_> = topics.iter().map(|t| &t.id).collect();
        assert_eq!(ids.len(), topics.len());
    }

    #[tokio::test]
    async fn list_sorted_by_category_then_title() {
        let catalog = Catalog::with_defaults();
        let topics = catalog.list().await;
        assert!(topics
            .windows(2)
            .all(|w| (&w[0].category, &w[0].title) <= (&w[1].category, &w[1].title)));
    }

    #[tokio::test]
    async fn upsert_last_write_wins() {
        let catalog = Catalog::new([Topic::new("a", "A", "X", Visualization::None)]);
        catalog.upsert(Topic::new("a", "A2", "X", Visualization::Stack)).await;

        let topic = catalog.get("a").await.unwrap();
        assert_eq!(topic.title, "A2");
        assert_eq!(topic.visualization, Visualization::Stack);
        assert!(catalog.get("missing").await.is_none());
    }
}
