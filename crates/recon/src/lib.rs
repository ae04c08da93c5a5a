//! `armorsmith-recon`: equipment slot/keyword reconciliation engine.
//!
//! Pure engine crate: reads a slot taxonomy and per-source overrides, decides
//! the minimal corrections for every item, and writes them through a
//! [`RecordStore`]. No CLI dependencies.

pub mod apply;
pub mod config;
pub mod crafting;
pub mod decide;
pub mod delta;
pub mod engine;
pub mod error;
pub mod guesses;
pub mod model;
pub mod naming;
pub mod overrides;
pub mod propagate;
pub mod records;
pub mod rules;
pub mod slots;
pub mod store;
pub mod taxonomy;

pub use config::PatcherConfig;
pub use decide::{PatchContext, PatchOptions};
pub use engine::{load_tables, run};
pub use error::ReconError;
pub use model::{PatchDecision, PatchReport};
pub use slots::{parse_slot_list, SlotMask};
pub use store::{MemoryStore, RecordStore};
