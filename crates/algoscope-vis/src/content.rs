//! Explanations and reference code shown next to each visualization.

use std::collections::HashMap;
use std::future::Future;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::catalog::{Topic, Visualization};
use crate::error::Result;

pub const EXPLANATION_PLACEHOLDER: &str =
    "Failed to load explanation. Please check your API key and network connection.";
pub const CODE_PLACEHOLDER: &str = "# Failed to load Python code.";

/// Markdown explanation plus a Python listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub explanation: String,
    pub python_code: String,
}

impl GeneratedContent {
    pub fn placeholder() -> Self {
        Self {
            explanation: EXPLANATION_PLACEHOLDER.to_string(),
            python_code: CODE_PLACEHOLDER.to_string(),
        }
    }
}

/// Produces content for a topic. Implementations may call out to a remote
/// model; failures are absorbed by [`ContentService`].
pub trait ContentGenerator: Send + Sync {
    fn generate(&self, topic: &Topic) -> impl Future<Output = Result<GeneratedContent>> + Send;
}

/// Remove a surrounding Markdown code fence from generated code.
pub fn strip_code_fences(raw: &str) -> String {
    let mut code = raw.trim();
    if let Some(rest) = code.strip_prefix("```python") {
        code = rest;
    } else if let Some(rest) = code.strip_prefix("```") {
        code = rest;
    }
    if let Some(rest) = code.strip_suffix("```") {
        code = rest;
    }
    code.trim().to_string()
}

/// Caches generated content per topic id for the life of the process.
pub struct ContentService<G> {
    generator: G,
    cache: RwLock<HashMap<String, GeneratedContent>>,
}

impl<G: ContentGenerator> ContentService<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Cached content, generating it on first request.
    ///
    /// Failures yield placeholders and are not cached, so a later request
    /// retries.
    pub async fn content(&self, topic: &Topic) -> GeneratedContent {
        if let Some(hit) = self.cache.read().await.get(&topic.id) {
            return hit.clone();
        }
        match self.generator.generate(topic).await {
            Ok(generated) => {
                let content = GeneratedContent {
                    explanation: generated.explanation.trim().to_string(),
                    python_code: strip_code_fences(&generated.python_code),
                };
                self.cache
                    .write()
                    .await
                    .entry(topic.id.clone())
                    .or_insert(content)
                    .clone()
            }
            Err(e) => {
                tracing::warn!("Content generation failed for {}: {}", topic.id, e);
                GeneratedContent::placeholder()
            }
        }
    }

    pub async fn is_cached(&self, id: &str) -> bool {
        self.cache.read().await.contains_key(id)
    }
}

/// Built-in content that needs no network access.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGenerator;

impl ContentGenerator for OfflineGenerator {
    async fn generate(&self, topic: &Topic) -> Result<GeneratedContent> {
        let (summary, time, space) = facts(topic.visualization);
        let explanation = format!(
            "## {}\n\n**What is it?** {}\n\n### Complexity\n\n- **Time:** {}\n- **Space:** {}\n",
            topic.title, summary, time, space
        );
        let python_code = format!("```python\n{}\n```", listing(topic));
        Ok(GeneratedContent {
            explanation,
            python_code,
        })
    }
}

fn facts(visualization: Visualization) -> (&'static str, &'static str, &'static str) {
    use Visualization as V;
    match visualization {
        V::BubbleSort => ("Repeatedly swaps adjacent out-of-order pairs until none remain.", "O(n²)", "O(1)"),
        V::SelectionSort => ("Moves the minimum of the unsorted suffix to its front, one position at a time.", "O(n²)", "O(1)"),
        V::InsertionSort => ("Grows a sorted prefix by shifting each new key left into place.", "O(n²)", "O(1)"),
        V::MergeSort => ("Splits the array in halves, sorts each, and merges them.", "O(n log n)", "O(n)"),
        V::QuickSort => ("Partitions around a pivot, then sorts both sides.", "O(n log n) average, O(n²) worst", "O(log n)"),
        V::HeapSort => ("Builds a max-heap, then repeatedly moves the root behind the heap.", "O(n log n)", "O(1)"),
        V::LinearSearch => ("Checks each element in turn until the target appears.", "O(n)", "O(1)"),
        V::BinarySearch => ("Halves a sorted search window around its midpoint.", "O(log n)", "O(1)"),
        V::BreadthFirstSearch | V::GraphTraversal => ("Visits nodes level by level using a queue.", "O(V + E)", "O(V)"),
        V::DepthFirstSearch => ("Follows one branch as deep as possible before backtracking, using a stack.", "O(V + E)", "O(V)"),
        V::Dijkstra => ("Finalizes the closest unfinished node and relaxes its edges.", "O((V + E) log V)", "O(V)"),
        V::CoinChange => ("Builds the fewest coins for every amount up to the target.", "O(amount × coins)", "O(amount)"),
        V::Knapsack => ("Fills a table of best values per item count and capacity.", "O(n × W)", "O(n × W)"),
        V::FibonacciMemoization => ("Caches each Fibonacci value so it is computed once.", "O(n)", "O(n)"),
        V::Recursion => ("Solves a problem by calling itself on a smaller instance.", "O(n)", "O(n) call stack"),
        V::Trie => ("Stores words as paths of letters sharing common prefixes.", "O(L) per word", "O(total letters)"),
        V::Stack => ("Last in, first out.", "O(1) push and pop", "O(n)"),
        V::Queue => ("First in, first out.", "O(1) enqueue and dequeue", "O(n)"),
        V::LinkedList => ("Nodes that each point to the next, so either end can grow or shrink.", "O(1) at the head, O(n) at the tail", "O(n)"),
        V::PythonList => ("A dynamic array: contiguous slots indexed from zero that grow on append.", "O(1) amortized append, O(n) insert", "O(n)"),
        V::PythonDict => ("A hash table mapping unique keys to values.", "O(1) average set, get and delete", "O(n)"),
        V::None => ("A core data structures and algorithms topic.", "Depends on the operation", "Depends on the operation"),
    }
}

fn listing(topic: &Topic) -> String {
    use Visualization as V;
    let body = match topic.visualization {
        V::BubbleSort => {
            "def bubble_sort(arr):\n    n = len(arr)\n    for i in range(n):\n        for j in range(n - i - 1):\n            if arr[j] > arr[j + 1]:\n                arr[j], arr[j + 1] = arr[j + 1], arr[j]\n    return arr"
        }
        V::InsertionSort => {
            "def insertion_sort(arr):\n    for i in range(1, len(arr)):\n        key = arr[i]\n        j = i - 1\n        while j >= 0 and arr[j] > key:\n            arr[j + 1] = arr[j]\n            j -= 1\n        arr[j + 1] = key\n    return arr"
        }
        V::SelectionSort => {
            "def selection_sort(arr):\n    n = len(arr)\n    for i in range(n - 1):\n        smallest = i\n        for j in range(i + 1, n):\n            if arr[j] < arr[smallest]:\n                smallest = j\n        arr[i], arr[smallest] = arr[smallest], arr[i]\n    return arr"
        }
        V::MergeSort => {
            "def merge_sort(arr):\n    if len(arr) <= 1:\n        return arr\n    mid = len(arr) // 2\n    left = merge_sort(arr[:mid])\n    right = merge_sort(arr[mid:])\n    merged, i, j = [], 0, 0\n    while i < len(left) and j < len(right):\n        if left[i] <= right[j]:\n            merged.append(left[i])\n            i += 1\n        else:\n            merged.append(right[j])\n            j += 1\n    return merged + left[i:] + right[j:]"
        }
        V::QuickSort => {
            "def quick_sort(arr, low=0, high=None):\n    if high is None:\n        high = len(arr) - 1\n    if low < high:\n        pivot = arr[high]\n        i = low - 1\n        for j in range(low, high):\n            if arr[j] <= pivot:\n                i += 1\n                arr[i], arr[j] = arr[j], arr[i]\n        arr[i + 1], arr[high] = arr[high], arr[i + 1]\n        quick_sort(arr, low, i)\n        quick_sort(arr, i + 2, high)\n    return arr"
        }
        V::HeapSort => {
            "def heapify(arr, n, i):\n    largest = i\n    left, right = 2 * i + 1, 2 * i + 2\n    if left < n and arr[left] > arr[largest]:\n        largest = left\n    if right < n and arr[right] > arr[largest]:\n        largest = right\n    if largest != i:\n        arr[i], arr[largest] = arr[largest], arr[i]\n        heapify(arr, n, largest)\n\ndef heap_sort(arr):\n    n = len(arr)\n    for i in range(n // 2 - 1, -1, -1):\n        heapify(arr, n, i)\n    for end in range(n - 1, 0, -1):\n        arr[0], arr[end] = arr[end], arr[0]\n        heapify(arr, end, 0)\n    return arr"
        }
        V::BreadthFirstSearch => {
            "from collections import deque\n\ndef bfs(graph, start):\n    visited = {start}\n    queue = deque([start])\n    order = []\n    while queue:\n        node = queue.popleft()\n        order.append(node)\n        for neighbor in sorted(graph[node]):\n            if neighbor not in visited:\n                visited.add(neighbor)\n                queue.append(neighbor)\n    return order"
        }
        V::DepthFirstSearch => {
            "def dfs(graph, start):\n    visited = set()\n    stack = [start]\n    order = []\n    while stack:\n        node = stack.pop()\n        if node in visited:\n            continue\n        visited.add(node)\n        order.append(node)\n        for neighbor in sorted(graph[node], reverse=True):\n            if neighbor not in visited:\n                stack.append(neighbor)\n    return order"
        }
        V::GraphTraversal => {
            "from collections import deque\n\ndef bfs(graph, start):\n    visited = {start}\n    queue = deque([start])\n    order = []\n    while queue:\n        node = queue.popleft()\n        order.append(node)\n        for neighbor in sorted(graph[node]):\n            if neighbor not in visited:\n                visited.add(neighbor)\n                queue.append(neighbor)\n    return order\n\ndef dfs(graph, start):\n    visited = set()\n    stack = [start]\n    order = []\n    while stack:\n        node = stack.pop()\n        if node in visited:\n            continue\n        visited.add(node)\n        order.append(node)\n        for neighbor in sorted(graph[node], reverse=True):\n            if neighbor not in visited:\n                stack.append(neighbor)\n    return order"
        }
        V::Dijkstra => {
            "import heapq\n\ndef dijkstra(graph, start):\n    dist = {node: float('inf') for node in graph}\n    dist[start] = 0\n    heap = [(0, start)]\n    while heap:\n        d, node = heapq.heappop(heap)\n        if d > dist[node]:\n            continue\n        for neighbor, weight in graph[node]:\n            if d + weight < dist[neighbor]:\n                dist[neighbor] = d + weight\n                heapq.heappush(heap, (dist[neighbor], neighbor))\n    return dist"
        }
        V::Knapsack => {
            "def knapsack(items, capacity):\n    n = len(items)\n    dp = [[0] * (capacity + 1) for _ in range(n + 1)]\n    for i, (weight, value) in enumerate(items, start=1):\n        for w in range(capacity + 1):\n            dp[i][w] = dp[i - 1][w]\n            if weight <= w:\n                dp[i][w] = max(dp[i][w], value + dp[i - 1][w - weight])\n    return dp[n][capacity]"
        }
        V::Trie => {
            "class TrieNode:\n    def __init__(self):\n        self.children = {}\n        self.is_end = False\n\nclass Trie:\n    def __init__(self):\n        self.root = TrieNode()\n\n    def insert(self, word):\n        node = self.root\n        for ch in word:\n            node = node.children.setdefault(ch, TrieNode())\n        node.is_end = True\n\n    def starts_with(self, prefix):\n        node = self.root\n        for ch in prefix:\n            if ch not in node.children:\n                return []\n            node = node.children[ch]\n        words, stack = [], [(node, prefix)]\n        while stack:\n            node, word = stack.pop()\n            if node.is_end:\n                words.append(word)\n            for ch, child in node.children.items():\n                stack.append((child, word + ch))\n        return sorted(words)"
        }
        V::BinarySearch => {
            "def binary_search(arr, target):\n    low, high = 0, len(arr) - 1\n    while low <= high:\n        mid = (low + high) // 2\n        if arr[mid] == target:\n            return mid\n        if arr[mid] < target:\n            low = mid + 1\n        else:\n            high = mid - 1\n    return -1"
        }
        V::LinearSearch => {
            "def linear_search(arr, target):\n    for i, value in enumerate(arr):\n        if value == target:\n            return i\n    return -1"
        }
        V::FibonacciMemoization => {
            "def fib(n, memo=None):\n    memo = {} if memo is None else memo\n    if n in memo:\n        return memo[n]\n    if n <= 1:\n        return n\n    memo[n] = fib(n - 1, memo) + fib(n - 2, memo)\n    return memo[n]"
        }
        V::Recursion => {
            "def factorial(n):\n    if n <= 1:\n        return 1\n    return n * factorial(n - 1)"
        }
        V::CoinChange => {
            "def coin_change(coins, amount):\n    dp = [0] + [float('inf')] * amount\n    for a in range(1, amount + 1):\n        for c in coins:\n            if c <= a:\n                dp[a] = min(dp[a], dp[a - c] + 1)\n    return dp[amount] if dp[amount] != float('inf') else -1"
        }
        V::Stack => {
            "stack = []\nstack.append(10)\nstack.append(25)\ntop = stack.pop()"
        }
        V::Queue => {
            "from collections import deque\n\nqueue = deque()\nqueue.append(10)\nqueue.append(25)\nfront = queue.popleft()"
        }
        V::LinkedList => {
            "class Node:\n    def __init__(self, value, next=None):\n        self.value = value\n        self.next = next\n\nclass LinkedList:\n    def __init__(self):\n        self.head = None\n\n    def add_head(self, value):\n        self.head = Node(value, self.head)\n\n    def add_tail(self, value):\n        if self.head is None:\n            self.head = Node(value)\n            return\n        node = self.head\n        while node.next:\n            node = node.next\n        node.next = Node(value)\n\n    def remove_head(self):\n        node = self.head\n        self.head = node.next\n        return node.value"
        }
        V::PythonList => {
            "numbers = [10, 20, 30, 40]\nnumbers.append(50)\nnumbers.insert(1, 15)\nlast = numbers.pop()\nprint(numbers[0], len(numbers))"
        }
        V::PythonDict => {
            "person = {'name': 'Alice', 'age': '30'}\nperson['city'] = 'Oslo'\ndel person['age']\ntry:\n    del person['zip']\nexcept KeyError as e:\n    print('KeyError:', e)"
        }
        V::None => return format!("# {}\n# No bundled reference implementation.", topic.title),
    };
    body.to_string()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::Error;

    struct Counting {
        calls: AtomicUsize,
        fail: bool,
    }

    impl ContentGenerator for Counting {
        async fn generate(&self, _topic: &Topic) -> Result<GeneratedContent> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::NotFound("model".into()));
            }
            Ok(GeneratedContent {
                explanation: "  text  ".into(),
                python_code: "```python\nprint(1)\n```".into(),
            })
        }
    }

    fn topic() -> Topic {
        Topic::new("stacks", "Stacks", "Stacks & Queues", Visualization::Stack)
    }

    #[test]
    fn strips_fences() {
        assert_eq!(strip_code_fences("```python\nx = 1\n```"), "x = 1");
        assert_eq!(strip_code_fences("```\nx = 1\n```"), "x = 1");
        assert_eq!(strip_code_fences("  x = 1  "), "x = 1");
    }

    #[tokio::test]
    async fn generated_once_per_topic() {
        let service = ContentService::new(Counting {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let first = service.content(&topic()).await;
        let second = service.content(&topic()).await;

        assert_eq!(first, second);
        assert_eq!(first.explanation, "text");
        assert_eq!(first.python_code, "print(1)");
        assert_eq!(service.generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failure_degrades_to_placeholders() {
        let service = ContentService::new(Counting {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        assert_eq!(service.content(&topic()).await, GeneratedContent::placeholder());
        assert!(!service.is_cached("stacks").await);

        service.content(&topic()).await;
        assert_eq!(service.generator.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn every_interactive_topic_has_a_listing() {
        for topic in Topic::defaults() {
            let content = OfflineGenerator.generate(&topic).await.unwrap();
            let bundled = !content.python_code.contains("No bundled reference");
            assert_eq!(bundled, topic.visualization != Visualization::None, "{}", topic.id);
        }
    }

    #[tokio::test]
    async fn offline_content_is_unfenced() {
        let service = ContentService::new(OfflineGenerator);
        let content = service.content(&topic()).await;
        assert!(content.explanation.starts_with("## Stacks"));
        assert!(!content.python_code.contains("```"));
        assert!(content.python_code.contains("stack.pop()"));
    }
}
