//! Item model plus the split / merge rules that reconcile a stored inventory
//! with the size a player is currently allowed.

pub mod item;
pub mod item_set;
pub mod merge;
pub mod split;

pub use item::{ItemStack, Slot};
pub use item_set::ItemSet;
pub use merge::merge;
pub use split::{split, Split};
