//! Core tracking types: path resolution, the inventory, and the tracker.

mod builder;
mod inventory;
mod paths;
mod resolver;
mod tracker;

pub use builder::FileTrackerBuilder;
pub use inventory::Inventory;
pub use paths::IntoTrackedPaths;
pub use resolver::{CompiledSuffix, ModifiedTime, PathResolver, modified_time};
pub use tracker::FileTracker;
