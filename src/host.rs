//! Calls from the BigInv engine out to the hosting platform.

use crate::holder::InventoryView;
use crate::inventory::ItemStack;
use crate::principal::PlayerId;

/// A message the platform should deliver to a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The owner's stored items did not all fit and some went to the backup
    BackupNeeded { owner: PlayerId, message: String },

    /// `viewer` was looking at `owner`'s BigInv when it was closed from under them
    ForceClosed {
        owner: PlayerId,
        viewer: PlayerId,
        message: String,
    },
}

impl Notice {
    /// Player the notice is addressed to
    pub fn recipient(&self) -> &PlayerId {
        match self {
            Notice::BackupNeeded { owner, .. } => owner,
            Notice::ForceClosed { viewer, .. } => viewer,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Notice::BackupNeeded { message, .. } | Notice::ForceClosed { message, .. } => message,
        }
    }
}

/// The platform side of an inventory session.
pub trait Host {
    /// Show `view` to `viewer`
    fn open_view(&mut self, viewer: &PlayerId, view: InventoryView);

    /// Close whatever inventory view `viewer` has open
    fn close_view(&mut self, viewer: &PlayerId);

    /// Redraw a view `viewer` already has open after its contents changed
    fn refresh_view(&mut self, viewer: &PlayerId, view: InventoryView) {
        self.open_view(viewer, view);
    }

    /// Put `items` into `player`'s own inventory.
    ///
    /// Returns the items that could not be added.
    fn give_items(&mut self, player: &PlayerId, items: Vec<ItemStack>) -> Vec<ItemStack>;

    fn notify(&mut self, notice: Notice);
}

/// Host that records every call, for tests and dry runs.
///
/// `give_limit` caps how many stacks one `give_items` call accepts; the rest
/// are handed back as not added.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub opened: Vec<(PlayerId, InventoryView)>,
    pub closed: Vec<PlayerId>,
    pub refreshed: Vec<(PlayerId, InventoryView)>,
    pub given: Vec<(PlayerId, Vec<ItemStack>)>,
    pub notices: Vec<Notice>,
    pub give_limit: Option<usize>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_give_limit(limit: usize) -> Self {
        Self {
            give_limit: Some(limit),
            ..Self::default()
        }
    }
}

impl Host for RecordingHost {
    fn open_view(&mut self, viewer: &PlayerId, view: InventoryView) {
        self.opened.push((viewer.clone(), view));
    }

    fn close_view(&mut self, viewer: &PlayerId) {
        self.closed.push(viewer.clone());
    }

    fn refresh_view(&mut self, viewer: &PlayerId, view: InventoryView) {
        self.refreshed.push((viewer.clone(), view));
    }

    fn give_items(&mut self, player: &PlayerId, mut items: Vec<ItemStack>) -> Vec<ItemStack> {
        let accepted = self.give_limit.unwrap_or(items.len()).min(items.len());
        let rejected = items.split_off(accepted);
        self.given.push((player.clone(), items));
        rejected
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn give_limit_hands_back_the_rest() {
        let mut host = RecordingHost::with_give_limit(1);
        let p = PlayerId::new("p");
        let rejected = host.give_items(
            &p,
            vec![ItemStack::new("A", 1), ItemStack::new("B", 1)],
        );
        assert_eq!(rejected, vec![ItemStack::new("B", 1)]);
        assert_eq!(host.given, vec![(p, vec![ItemStack::new("A", 1)])]);
    }

    #[test]
    fn notice_recipient() {
        let n = Notice::ForceClosed {
            owner: PlayerId::new("o"),
            viewer: PlayerId::new("v"),
            message: "bye".into(),
        };
        assert_eq!(n.recipient(), &PlayerId::new("v"));
        assert_eq!(n.message(), "bye");
    }
}
