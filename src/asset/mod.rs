//! Entry point discovery and classification.

mod kind;
pub mod rule;
mod scan;

pub use kind::{EntryFile, EntryKind};
pub use rule::RuleTable;
pub use scan::{DiscoveryError, discover_paths};
