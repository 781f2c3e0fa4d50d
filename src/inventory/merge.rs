//! Backup merging.

use super::item_set::ItemSet;

/// Combine a freshly computed overflow with a previously stored backup.
///
/// Non-empty items of `new_overflow` come first, followed by the non-empty
/// items of `prior_backup`. The result is dense and unbounded; two empty
/// inputs give an empty set.
pub fn merge(new_overflow: &ItemSet, prior_backup: &ItemSet) -> ItemSet {
    let mut items = new_overflow.items();
    items.extend(prior_backup.items());
    ItemSet::from_items(items)
}
