//! StepStore - step-structured text handling for instruction conversations
//!
//! Turns generated instruction text into addressable steps, remembers a small
//! window of recent builds, resolves natural-language references like
//! "step 3 from 2 builds ago", and packs replies into transport-sized
//! fragments.
//!
//! # Pipeline
//!
//! ```text
//! generated text ─▶ segment ─▶ map_text(bold_units) ─▶ Build ─▶ HistoryStore::push
//!                                        │
//!                                        └─▶ sections ─▶ chunk ─▶ replies
//!
//! "explain step 2 of the previous build" ─▶ parse ─▶ resolve(store) ─▶ ResolvedReference
//! ```
//!
//! # Example
//!
//! ```
//! use stepstore::{Build, HistoryStore, chunk, resolve_text, segment};
//!
//! let text = "Tools:\n- saw\n#### Step 1: Cut\n#### Step 2: Sand";
//! let segmentation = segment(text);
//!
//! let mut store = HistoryStore::new(2);
//! store.push(Build::from_segmentation(&segmentation));
//!
//! let resolved = resolve_text("explain step 2 of the last build", &store).unwrap().unwrap();
//! assert_eq!(resolved.target, "#### Step 2: Sand");
//! assert_eq!(chunk("a b c", 3), vec!["a b", "c"]);
//! ```

pub mod cli;
pub mod config;
mod chunk;
mod format;
mod history;
mod resolve;
mod segment;

pub use chunk::chunk;
pub use format::bold_units;
pub use history::{Build, HistoryError, HistoryStore};
pub use resolve::{Grammar, Reference, ReferenceRequest, ResolvedReference, parse, resolve, resolve_text};
pub use segment::{Section, SectionKind, Segmentation, Step, is_step_boundary, segment};

/// Default per-message character limit (margin below a 2000-character ceiling)
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 1995;

/// Default number of builds remembered
pub const DEFAULT_HISTORY_CAPACITY: usize = 2;
