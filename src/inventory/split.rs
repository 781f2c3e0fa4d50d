//! Overflow splitting: fit a stored item set into the currently allowed size.

use super::item::Slot;
use super::item_set::ItemSet;

/// Result of [`split`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    /// Exactly `allowed_size` slots.
    pub in_bounds: ItemSet,
    /// Dense (no empty slots) set of items that did not fit.
    pub overflow: ItemSet,
    /// Items moved from past the boundary into empty in-bounds slots.
    pub packed: usize,
    /// The input was longer than `allowed_size`.
    pub truncated: bool,
}

/// Split `contents` into an in-bounds region of `allowed_size` slots and an
/// overflow region.
///
/// The first `allowed_size` slots are copied verbatim. Non-empty slots past
/// the boundary are packed first-fit, left to right, into empty in-bounds
/// slots; whatever is left over is returned as overflow in its original
/// order. No item is ever dropped.
///
/// `allowed_size` must be non-zero; callers reject a zero grant before getting
/// here. In release builds a zero size yields an empty in-bounds region and
/// everything in the overflow.
pub fn split(contents: &ItemSet, allowed_size: usize) -> Split {
    debug_assert!(allowed_size > 0, "split called with allowed_size 0");

    let slots = contents.contents();
    let boundary = slots.len().min(allowed_size);

    let mut in_bounds = ItemSet::from_slots(&padded(&slots[..boundary], allowed_size));

    if slots.len() <= allowed_size {
        return Split {
            in_bounds,
            overflow: ItemSet::default(),
            packed: 0,
            truncated: false,
        };
    }

    let mut packed = 0;
    let mut leftover = Vec::new();
    for item in slots[boundary..].iter().flatten() {
        match in_bounds.first_empty() {
            Some(index) => {
                in_bounds.set(index, Some(item.clone()));
                packed += 1;
            }
            None => leftover.push(item.clone()),
        }
    }

    Split {
        in_bounds,
        overflow: ItemSet::from_items(leftover),
        packed,
        truncated: true,
    }
}

fn padded(slots: &[Slot], len: usize) -> Vec<Slot> {
    let mut out = slots.to_vec();
    out.resize(len, None);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::ItemStack;

    fn item(n: u32) -> ItemStack {
        ItemStack::new(format!("ITEM_{n}"), n)
    }

    fn full(range: std::ops::Range<u32>) -> Vec<Option<ItemStack>> {
        range.map(|n| Some(item(n))).collect()
    }

    #[test]
    fn shorter_input_is_padded() {
        let contents = ItemSet::from_items(vec![item(1), item(2)]);
        let split = split(&contents, 9);
        assert_eq!(split.in_bounds.len(), 9);
        assert_eq!(split.in_bounds.get(0), Some(item(1)));
        assert_eq!(split.in_bounds.get(1), Some(item(2)));
        assert!(split.overflow.is_empty());
        assert_eq!(split.packed, 0);
        assert!(!split.truncated);
    }

    #[test]
    fn trailing_empty_slots_are_dropped_without_overflow() {
        let mut slots = full(0..9);
        slots.extend(vec![None; 9]);
        let split = split(&ItemSet::from_slots(&slots), 9);
        assert_eq!(split.in_bounds.contents(), full(0..9));
        assert!(split.overflow.is_empty());
        assert!(split.truncated);
    }

    #[test]
    fn full_region_overflows_everything_past_boundary() {
        let split = split(&ItemSet::from_slots(&full(0..18)), 9);
        assert_eq!(split.in_bounds.contents(), full(0..9));
        assert_eq!(split.overflow.contents(), full(9..18));
        assert_eq!(split.packed, 0);
    }

    #[test]
    fn packs_into_interior_holes_first_fit() {
        let mut slots = full(0..9);
        slots[2] = None;
        slots[5] = None;
        slots.push(None);
        slots.push(Some(item(100)));
        slots.push(Some(item(101)));
        slots.push(Some(item(102)));

        let split = split(&ItemSet::from_slots(&slots), 9);
        assert_eq!(split.in_bounds.get(2), Some(item(100)));
        assert_eq!(split.in_bounds.get(5), Some(item(101)));
        assert_eq!(split.overflow.contents(), vec![Some(item(102))]);
        assert_eq!(split.packed, 2);
    }

    #[test]
    fn deterministic() {
        let mut slots = full(0..27);
        slots[3] = None;
        slots[20] = None;
        let contents = ItemSet::from_slots(&slots);
        assert_eq!(split(&contents, 18), split(&contents, 18));
    }

    #[test]
    fn never_drops_items() {
        let mut slots = full(0..40);
        for hole in [1, 7, 12, 30, 33] {
            slots[hole] = None;
        }
        let contents = ItemSet::from_slots(&slots);
        for size in [9, 18, 27, 36, 45, 54] {
            let split = split(&contents, size);
            assert_eq!(split.in_bounds.len(), size);
            assert_eq!(
                split.in_bounds.item_count() + split.overflow.item_count(),
                contents.item_count(),
                "size {size}"
            );
        }
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn zero_size_overflows_everything() {
        let contents = ItemSet::from_slots(&full(0..3));
        let split = split(&contents, 0);
        assert_eq!(split.in_bounds.len(), 0);
        assert_eq!(split.overflow.item_count(), 3);
    }
}
