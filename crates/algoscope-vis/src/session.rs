//! One visualization session per topic.
//!
//! A session owns the learner's inputs (arrays, targets, graphs, words), the
//! playback controller, and the autoplay task. Views are broadcast to
//! WebSocket subscribers after every change.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex, MutexGuard};
use tokio::task::JoinHandle;

use algoscope_graph::{EditOutcome, EditorMode, Graph, GraphEditor, NodeId, Position};
use algoscope_steps::{
    input, ArrayState, Item, Outcome, Scenario, Scene, SortAlgorithm, TraversalOrder, Trie,
    VisualState,
};

use crate::catalog::{Topic, Visualization};
use crate::config::VisConfig;
use crate::error::{Error, Result};
use crate::playback::{Playback, PlaybackSpeed, PlaybackState, PlaybackStatus, Tick, TickTicket};
use crate::present::Presentation;
use crate::structure::{Structure, StructureEdit};

/// Views buffered per subscriber before the slowest starts lagging.
const VIEW_CHANNEL_CAPACITY: usize = 64;

const SEED_WORDS: [&str; 5] = ["car", "cart", "cat", "do", "dog"];

/// What the trie visualization does when started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrieMode {
    #[default]
    Insert,
    Search,
}

/// Learner-controlled inputs. Only the fields relevant to the session's
/// visualization are used.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inputs {
    pub values: Vec<i64>,
    pub array_size: usize,
    pub target: i64,
    pub amount: u64,
    pub coins: Vec<u64>,
    pub capacity: u64,
    pub items: Vec<Item>,
    pub n: u64,
    pub word: String,
    pub trie_mode: TrieMode,
    pub order: TraversalOrder,
    pub start: Option<NodeId>,
    pub end: Option<NodeId>,
}

/// Raw field values from the input form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputRequest {
    pub target: Option<String>,
    pub amount: Option<String>,
    pub coins: Option<String>,
    pub capacity: Option<String>,
    pub items: Option<Vec<Item>>,
    pub n: Option<String>,
    pub word: Option<String>,
    pub mode: Option<TrieMode>,
    pub order: Option<TraversalOrder>,
}

/// Pointer gesture phases for dragging nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragPhase {
    Press,
    Move,
    Release,
}

/// Graph editor state for the frontend.
#[derive(Debug, Clone, Serialize)]
pub struct GraphView {
    pub graph: Graph,
    pub mode: EditorMode,
    pub pending_edge: Option<NodeId>,
    pub locked: bool,
    pub weighted: bool,
    pub edge_weight: u32,
}

/// Everything the frontend needs to draw a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub topic: String,
    pub visualization: Visualization,
    pub status: PlaybackStatus,
    pub message: Option<String>,
    pub outcome: Option<Outcome>,
    pub presentation: Presentation,
    pub inputs: Inputs,
    pub graph: Option<GraphView>,
    pub structure: Option<Structure>,
}

/// A single visualization timeline.
pub struct Session {
    topic: Topic,
    inputs: Inputs,
    editor: Option<GraphEditor>,
    trie: Trie,
    structure: Option<Structure>,
    /// Result of the last direct edit, shown until playback says more
    notice: Option<String>,
    /// Container element touched by the last direct edit
    focus: Option<usize>,
    rng: StdRng,
    playback: Playback,
    events: broadcast::Sender<SessionView>,
    ticker: Option<JoinHandle<()>>,
}

impl Session {
    pub fn new(topic: Topic, config: &VisConfig) -> Result<Self> {
        use Visualization as V;
        if !topic.visualization.is_interactive() {
            return Err(Error::Unsupported(format!("{} has no visualization.", topic.title)));
        }
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let array_size = input::check_array_size(config.array_size).unwrap_or(input::DEFAULT_ARRAY_SIZE);

        let (values, target) = match topic.visualization {
            V::LinearSearch => {
                let values = random_values(&mut rng, input::LINEAR_SEARCH_SIZE);
                let target = values[rng.gen_range(0..values.len())];
                (values, target)
            }
            V::BinarySearch => ((1..=15).map(|i| i * 3).collect(), 27),
            _ => (random_values(&mut rng, array_size), 0),
        };
        let order = match topic.visualization {
            V::DepthFirstSearch => TraversalOrder::Depth,
            _ => TraversalOrder::Breadth,
        };
        let n = match topic.visualization {
            V::Recursion => 5,
            _ => 7,
        };
        let editor = match topic.visualization {
            V::BreadthFirstSearch | V::DepthFirstSearch | V::GraphTraversal => {
                Some(GraphEditor::new(Graph::traversal_default()))
            }
            V::Dijkstra => Some(GraphEditor::weighted(Graph::weighted_default())),
            _ => None,
        };
        let structure = Structure::for_visualization(topic.visualization);

        let inputs = Inputs {
            values,
            array_size,
            target,
            amount: 11,
            coins: vec![1, 2, 5],
            capacity: 50,
            items: vec![Item::new(10, 60), Item::new(20, 100), Item::new(30, 120)],
            n,
            word: "cars".to_string(),
            trie_mode: TrieMode::Insert,
            order,
            start: Some(NodeId(1)),
            end: None,
        };
        let (events, _) = broadcast::channel(VIEW_CHANNEL_CAPACITY);
        let placeholder = VisualState::new(Scene::Array(ArrayState::default()));

        let mut session = Self {
            topic,
            inputs,
            editor,
            trie: Trie::with_words(SEED_WORDS),
            structure,
            focus: None,
            notice: None,
            rng,
            playback: Playback::new(placeholder, PlaybackSpeed::new(config.speed)),
            events,
            ticker: None,
        };
        session.reload()?;
        tracing::debug!("Session created for {}", session.topic.id);
        Ok(session)
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    pub fn inputs(&self) -> &Inputs {
        &self.inputs
    }

    pub fn trie(&self) -> &Trie {
        &self.trie
    }

    pub fn graph(&self) -> Option<&Graph> {
        self.editor.as_ref().map(GraphEditor::graph)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionView> {
        self.events.subscribe()
    }

    /// Scenario for the current inputs.
    pub fn scenario(&self) -> Result<Scenario> {
        use Visualization as V;
        let inputs = &self.inputs;
        let sort = |algorithm: SortAlgorithm| -> Result<Scenario> {
            Ok(Scenario::sort(algorithm, inputs.values.clone()))
        };
        match self.topic.visualization {
            V::BubbleSort => sort(SortAlgorithm::Bubble),
            V::SelectionSort => sort(SortAlgorithm::Selection),
            V::InsertionSort => sort(SortAlgorithm::Insertion),
            V::MergeSort => sort(SortAlgorithm::Merge),
            V::QuickSort => sort(SortAlgorithm::Quick),
            V::HeapSort => sort(SortAlgorithm::Heap),
            V::LinearSearch => Ok(Scenario::linear_search(inputs.values.clone(), inputs.target)?),
            V::BinarySearch => Ok(Scenario::binary_search(inputs.values.clone(), inputs.target)?),
            V::BreadthFirstSearch | V::DepthFirstSearch | V::GraphTraversal => {
                let graph = self.require_graph()?;
                Ok(Scenario::traversal(inputs.order, graph, inputs.start)?)
            }
            V::Dijkstra => {
                let graph = self.require_graph()?;
                Ok(Scenario::shortest_path(graph, inputs.start, inputs.end)?)
            }
            V::CoinChange => Ok(Scenario::coin_change(inputs.coins.clone(), inputs.amount)?),
            V::Knapsack => Ok(Scenario::knapsack(inputs.items.clone(), inputs.capacity)?),
            V::FibonacciMemoization => Ok(Scenario::fibonacci(inputs.n)?),
            V::Recursion => Ok(Scenario::factorial(inputs.n)?),
            V::Trie => match inputs.trie_mode {
                TrieMode::Insert => Ok(Scenario::trie_insert(&self.trie, &inputs.word)?),
                TrieMode::Search => Ok(Scenario::trie_search(&self.trie, &inputs.word)?),
            },
            V::Stack
            | V::Queue
            | V::LinkedList
            | V::PythonList
            | V::PythonDict
            | V::None => Err(Error::Unsupported(format!(
                "{} is edited directly, not played.",
                self.topic.title
            ))),
        }
    }

    fn require_graph(&self) -> Result<&Graph> {
        self.graph()
            .ok_or_else(|| Error::Unsupported("This visualization has no graph.".into()))
    }

    /// Rebuild the idle baseline from the current inputs.
    fn reload(&mut self) -> Result<()> {
        if self.structure.is_some() {
            return Ok(());
        }
        match self.scenario() {
            Ok(scenario) => self.playback.load(scenario)?,
            Err(e) => tracing::debug!("Keeping previous baseline for {}: {}", self.topic.id, e),
        }
        if let Some(editor) = self.editor.as_mut() {
            editor.unlock();
        }
        Ok(())
    }

    fn ensure_idle_input(&self) -> Result<()> {
        if self.playback.is_active() {
            Err(Error::Busy)
        } else {
            Ok(())
        }
    }

    /// Begin or resume autoplay. Returns the first ticket to schedule.
    pub fn start(&mut self) -> Result<Option<TickTicket>> {
        self.prepare_run()?;
        let ticket = self.playback.start()?;
        self.after_change();
        Ok(ticket)
    }

    /// Apply one step and pause.
    pub fn step(&mut self) -> Result<()> {
        self.prepare_run()?;
        self.stop_ticker();
        self.playback.step()?;
        self.after_change();
        Ok(())
    }

    /// From idle, snapshot the inputs into a fresh scenario and lock the editor.
    fn prepare_run(&mut self) -> Result<()> {
        if self.playback.state() != PlaybackState::Idle {
            return Ok(());
        }
        let scenario = self.scenario()?;
        self.playback.load(scenario)?;
        if let Some(editor) = self.editor.as_mut() {
            editor.lock();
        }
        tracing::info!("Session {} started", self.topic.id);
        Ok(())
    }

    pub fn pause(&mut self) {
        self.stop_ticker();
        self.playback.pause();
        self.after_change();
    }

    pub fn reset(&mut self) -> Result<()> {
        self.stop_ticker();
        self.playback.reset();
        self.notice = None;
        self.reload()?;
        tracing::info!("Session {} reset", self.topic.id);
        self.publish();
        Ok(())
    }

    pub fn set_speed(&mut self, speed: u8) {
        self.playback.set_speed(PlaybackSpeed::new(speed));
        self.publish();
    }

    /// Regenerate the random array at a new length (sorts only).
    pub fn set_array_size(&mut self, size: usize) -> Result<()> {
        if !self.is_sort() {
            return Err(Error::Unsupported("Only sorting visualizations have an array size.".into()));
        }
        let size = input::check_array_size(size)?;
        self.ensure_idle_input()?;
        self.inputs.array_size = size;
        self.regenerate()
    }

    /// Fresh random array.
    pub fn regenerate(&mut self) -> Result<()> {
        use Visualization as V;
        self.ensure_idle_input()?;
        match self.topic.visualization {
            V::LinearSearch => {
                let values = random_values(&mut self.rng, input::LINEAR_SEARCH_SIZE);
                self.inputs.target = values[self.rng.gen_range(0..values.len())];
                self.inputs.values = values;
            }
            _ if self.is_sort() => {
                self.inputs.values = random_values(&mut self.rng, self.inputs.array_size);
            }
            _ => return Err(Error::Unsupported("This visualization has no random array.".into())),
        }
        self.reload()?;
        self.publish();
        Ok(())
    }

    fn is_sort(&self) -> bool {
        use Visualization as V;
        matches!(
            self.topic.visualization,
            V::BubbleSort | V::SelectionSort | V::InsertionSort | V::MergeSort | V::QuickSort | V::HeapSort
        )
    }

    /// Validate and apply form fields. Nothing changes unless every field
    /// present is valid.
    pub fn set_input(&mut self, request: InputRequest) -> Result<()> {
        self.ensure_idle_input()?;
        let mut next = self.inputs.clone();

        if let Some(raw) = &request.target {
            next.target = input::parse_integer("Target", raw)?;
        }
        if let Some(raw) = &request.amount {
            next.amount = input::parse_in_range("Amount", raw, input::AMOUNT)?;
        }
        if let Some(raw) = &request.coins {
            next.coins = input::parse_coins(raw)?;
        }
        if let Some(raw) = &request.capacity {
            next.capacity = input::parse_in_range("Capacity", raw, input::CAPACITY)?;
        }
        if let Some(items) = &request.items {
            // full validation happens when the scenario is built
            Scenario::knapsack(items.clone(), next.capacity)?;
            next.items = items.clone();
        }
        if let Some(raw) = &request.n {
            let range = match self.topic.visualization {
                Visualization::Recursion => input::FACTORIAL_N,
                _ => input::FIB_N,
            };
            next.n = input::parse_in_range("n", raw, range)?;
        }
        if let Some(mode) = request.mode {
            next.trie_mode = mode;
        }
        if let Some(raw) = &request.word {
            next.word = match next.trie_mode {
                TrieMode::Insert => input::parse_word(raw)?,
                TrieMode::Search => input::parse_prefix(raw)?,
            };
        }
        if let Some(order) = request.order {
            if self.topic.visualization != Visualization::GraphTraversal {
                return Err(Error::Unsupported("Only the graph topic switches traversal order.".into()));
            }
            next.order = order;
        }

        self.inputs = next;
        self.notice = None;
        self.reload()?;
        self.publish();
        Ok(())
    }

    /// Apply a direct edit to a stack, queue, list, linked list or dict.
    pub fn edit(&mut self, edit: StructureEdit) -> Result<()> {
        let edited = self.structure_mut()?.apply(edit)?;
        tracing::debug!("{}: {}", self.topic.id, edited.message);
        self.notice = Some(edited.message);
        self.focus = edited.focus;
        self.publish();
        Ok(())
    }

    pub fn push(&mut self, raw: &str) -> Result<()> {
        self.edit(StructureEdit::Push { value: raw.to_string() })
    }

    pub fn pop(&mut self) -> Result<()> {
        self.edit(StructureEdit::Pop)
    }

    fn structure_mut(&mut self) -> Result<&mut Structure> {
        self.structure
            .as_mut()
            .ok_or_else(|| Error::Unsupported("This visualization is not an editable data structure.".into()))
    }

    fn editor_mut(&mut self) -> Result<&mut GraphEditor> {
        self.editor
            .as_mut()
            .ok_or_else(|| Error::Unsupported("This visualization has no graph.".into()))
    }

    /// A finished run is discarded before the graph changes.
    fn leave_finished(&mut self) -> Result<()> {
        if self.playback.state() == PlaybackState::Finished {
            self.playback.reset();
            self.reload()?;
        }
        Ok(())
    }

    pub fn set_mode(&mut self, mode: EditorMode) -> Result<()> {
        self.editor_mut()?.set_mode(mode);
        self.publish();
        Ok(())
    }

    pub fn set_edge_weight(&mut self, weight: i64) -> Result<()> {
        self.editor_mut()?.set_edge_weight(weight)?;
        self.publish();
        Ok(())
    }

    pub fn click(&mut self, at: Position) -> Result<EditOutcome> {
        self.editor_mut()?;
        self.leave_finished()?;
        let outcome = self.editor_mut()?.click(at)?;
        self.publish();
        Ok(outcome)
    }

    /// Node dragging moves positions only, so it is allowed mid-run.
    pub fn drag(&mut self, phase: DragPhase, at: Position) -> Result<EditOutcome> {
        let editor = self.editor_mut()?;
        let outcome = match phase {
            DragPhase::Press => editor.press(at)?,
            DragPhase::Move => editor.drag_to(at)?,
            DragPhase::Release => editor.release(),
        };
        if !matches!(outcome, EditOutcome::Ignored) {
            self.publish();
        }
        Ok(outcome)
    }

    pub fn set_start_node(&mut self, node: NodeId) -> Result<()> {
        self.ensure_idle_input()?;
        if !self.require_graph()?.contains(node) {
            return Err(algoscope_graph::EditError::UnknownNode(node).into());
        }
        self.inputs.start = Some(node);
        self.reload()?;
        self.publish();
        Ok(())
    }

    /// Pick the shortest-path destination. After a finished run the path is
    /// read from the recorded predecessors without replaying.
    pub fn set_end_node(&mut self, node: Option<NodeId>) -> Result<()> {
        if self.topic.visualization != Visualization::Dijkstra {
            return Err(Error::Unsupported("Only shortest paths have an end node.".into()));
        }
        if let Some(node) = node {
            if !self.require_graph()?.contains(node) {
                return Err(algoscope_graph::EditError::UnknownNode(node).into());
            }
        }
        self.inputs.end = node;
        if self.playback.state() == PlaybackState::Idle {
            self.reload()?;
        }
        self.publish();
        Ok(())
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }

    fn set_ticker(&mut self, ticker: JoinHandle<()>) {
        self.stop_ticker();
        self.ticker = Some(ticker);
    }

    /// Fire one autoplay ticket.
    pub fn tick(&mut self, ticket: TickTicket) -> Tick {
        let tick = self.playback.fire(ticket);
        if tick != Tick::Stale {
            self.after_change();
        }
        tick
    }

    fn after_change(&mut self) {
        if self.playback.state() == PlaybackState::Finished {
            self.adopt_results();
        }
        self.publish();
    }

    /// Keep what a finished run built, so the next run starts from it.
    fn adopt_results(&mut self) {
        let visual = self.playback.visual();
        if let (Some(Outcome::Inserted { .. }), Some(trie)) = (&visual.outcome, visual.trie()) {
            if trie.trie != self.trie {
                self.trie = trie.trie.clone();
                tracing::debug!("Trie now holds {} nodes", self.trie.len());
            }
        }
    }

    pub fn view(&self) -> SessionView {
        let visual = self.playback.visual();
        let end = match (self.topic.visualization, self.playback.state()) {
            (Visualization::Dijkstra, PlaybackState::Finished) => self.inputs.end,
            _ => None,
        };
        SessionView {
            topic: self.topic.id.clone(),
            visualization: self.topic.visualization,
            status: PlaybackStatus::from(&self.playback),
            message: match (&visual.message, &self.notice) {
                (Some(message), _) if self.playback.state() != PlaybackState::Idle => Some(message.clone()),
                (_, Some(notice)) => Some(notice.clone()),
                (message, None) => message.clone(),
            },
            outcome: visual.outcome.clone(),
            presentation: match &self.structure {
                Some(structure) => Presentation::of_structure(structure, self.focus),
                None => Presentation::of(visual, self.graph(), end),
            },
            inputs: self.inputs.clone(),
            graph: self.editor.as_ref().map(|editor| GraphView {
                graph: editor.graph().clone(),
                mode: editor.mode(),
                pending_edge: editor.pending_edge(),
                locked: editor.is_locked(),
                weighted: editor.is_weighted(),
                edge_weight: editor.edge_weight(),
            }),
            structure: self.structure.clone(),
        }
    }

    fn publish(&self) {
        // no subscribers is fine
        let _ = self.events.send(self.view());
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}

fn random_values(rng: &mut StdRng, len: usize) -> Vec<i64> {
    (0..len).map(|_| rng.gen_range(input::VALUE_RANGE)).collect()
}

/// Shared handle that also drives autoplay.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<Session>>,
}

impl SessionHandle {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    pub async fn lock(&self) -> MutexGuard<'_, Session> {
        self.inner.lock().await
    }

    /// Start or resume, spawning the autoplay task.
    pub async fn start(&self) -> Result<SessionView> {
        let mut session = self.inner.lock().await;
        if let Some(ticket) = session.start()? {
            let ticker = tokio::spawn(autoplay(self.clone(), ticket));
            session.set_ticker(ticker);
        }
        Ok(session.view())
    }
}

/// Sleep, fire, repeat, until the ticket goes stale or the run finishes.
async fn autoplay(handle: SessionHandle, mut ticket: TickTicket) {
    loop {
        let interval = handle.lock().await.playback().speed().interval();
        tokio::time::sleep(interval).await;
        match handle.lock().await.tick(ticket) {
            Tick::Next(next) => ticket = next,
            Tick::Finished | Tick::Stale => break,
        }
    }
}
