//! The resource tree and its items.

pub mod item;
pub mod model;

pub use item::{Expansion, Item, ItemRef, NodeId, Source};
pub use model::{Backends, ResourceTree, TreeOptions};
