//! Algoscope Visualization
//!
//! Step-by-step animation of classic algorithms and data structures.
//!
//! # Architecture
//!
//! - **Catalog**: learning topics and the visualization each one opens
//! - **Session**: per-topic inputs, graph editor and playback
//! - **Playback**: idle / running / paused / finished controller that pulls
//!   steps from a producer one tick at a time
//! - **Structure**: stacks, queues, lists and dicts edited directly
//! - **Presentation**: colour-coded bars, graphs, tables and tries
//! - **WebSocket**: streams session views to the browser
//! - **REST API**: control playback and edit inputs
//!
//! # Usage
//!
//! ```ignore
//! let config = VisConfig::from_env_and_args(std::env::args().skip(1))?;
//! VisServer::new(config).serve().await?;
//! ```

mod catalog;
mod config;
mod content;
mod error;
mod playback;
mod present;
mod server;
mod session;
mod structure;

pub use catalog::{Catalog, Topic, Visualization};
pub use config::{VisConfig, CONFIG_ENV};
pub use content::{ContentGenerator, ContentService, GeneratedContent, OfflineGenerator};
pub use error::{Error, Result};
pub use playback::{Playback, PlaybackSpeed, PlaybackState, PlaybackStatus, ProducerSource, Tick, TickTicket};
pub use present::{Layout, Presentation, Tone};
pub use server::VisServer;
pub use session::{DragPhase, InputRequest, Inputs, Session, SessionHandle, SessionView, TrieMode};
pub use structure::{Edited, Structure, StructureEdit, LIST_CAPACITY, STRUCTURE_CAPACITY};
