//! Inbound platform events and their routing onto a [`Container`].

use std::collections::VecDeque;

use crate::container::{Container, HandlerOutcome};
use crate::host::{Host, Notice};
use crate::inventory::ItemStack;
use crate::principal::{PlayerId, Principal};
use crate::store::PlayerStore;

pub use crate::holder::SlotChange;

/// What the click landed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickTarget {
    /// The crafting result slot of the clicker's own inventory view
    TriggerSlot { occupied: bool },
    /// A slot of `owner`'s BigInv
    Storage { owner: PlayerId },
    /// Anything else, e.g. the clicker's own inventory below a BigInv
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Click {
    pub target: ClickTarget,
    pub shift: bool,
    /// Owner of the BigInv shown in the top half of the view, if any
    pub top_owner: Option<PlayerId>,
    /// Slots of the BigInv the click rewrites, as the platform would leave
    /// them. A shift-click from below lands in the top BigInv.
    pub changes: Vec<SlotChange>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryEvent<P> {
    Connect(P),
    Disconnect(PlayerId),
    Click { clicker: P, click: Click },
    Drag {
        clicker: P,
        top_owner: Option<PlayerId>,
        changes: Vec<SlotChange>,
    },
    /// `viewer` closed a view; `owner` is set when it was a BigInv
    Close {
        viewer: PlayerId,
        owner: Option<PlayerId>,
    },
    Death {
        player: PlayerId,
        keep_inventory: bool,
    },
}

/// How the platform should finish handling an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventResponse {
    Proceed,
    Cancel,
    Outcome(HandlerOutcome),
    /// Items the platform should drop where the player died
    Drops(Vec<ItemStack>),
}

enum Deferred<P> {
    Open(P),
}

pub struct EventRouter<S, H, P> {
    container: Container<S, H>,
    deferred: VecDeque<Deferred<P>>,
}

impl<S: PlayerStore, H: Host, P: Principal> EventRouter<S, H, P> {
    pub fn new(container: Container<S, H>) -> Self {
        Self {
            container,
            deferred: VecDeque::new(),
        }
    }

    pub fn container(&self) -> &Container<S, H> {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut Container<S, H> {
        &mut self.container
    }

    /// Tasks waiting for the next [`tick`](Self::tick)
    pub fn pending(&self) -> usize {
        self.deferred.len()
    }

    pub fn handle(&mut self, event: InventoryEvent<P>) -> EventResponse {
        match event {
            InventoryEvent::Connect(player) => {
                tracing::debug!("[biginv] [connect] loading owner={}", player.id());
                let outcome = self.container.load(&player);
                if outcome == HandlerOutcome::NeededBackup {
                    let messages = self.container.messages();
                    let message = messages.prefixed(&messages.backup_needed_login);
                    self.container.host_mut().notify(Notice::BackupNeeded {
                        owner: player.id().clone(),
                        message,
                    });
                }
                EventResponse::Outcome(outcome)
            }
            InventoryEvent::Disconnect(id) => {
                tracing::debug!("[biginv] [disconnect] saving owner={}", id);
                EventResponse::Outcome(self.container.save(&id, true))
            }
            InventoryEvent::Click { clicker, click } => self.on_click(clicker, click),
            InventoryEvent::Drag {
                clicker,
                top_owner,
                changes,
            } => match top_owner {
                Some(owner) => self.write(&owner, &clicker, &changes),
                None => EventResponse::Proceed,
            },
            InventoryEvent::Close { viewer, owner } => match owner {
                Some(owner) => EventResponse::Outcome(self.container.close_view(&owner, &viewer)),
                None => EventResponse::Proceed,
            },
            InventoryEvent::Death {
                player,
                keep_inventory,
            } => {
                if keep_inventory {
                    EventResponse::Proceed
                } else {
                    EventResponse::Drops(self.container.clear(&player, true))
                }
            }
        }
    }

    fn on_click(&mut self, clicker: P, click: Click) -> EventResponse {
        match click.target {
            ClickTarget::TriggerSlot { occupied: false } => {
                // the open must wait until the platform has finished this click
                self.deferred.push_back(Deferred::Open(clicker));
                EventResponse::Proceed
            }
            ClickTarget::Storage { owner } => self.write(&owner, &clicker, &click.changes),
            _ if click.shift => match click.top_owner {
                Some(owner) => self.write(&owner, &clicker, &click.changes),
                None => EventResponse::Proceed,
            },
            _ => EventResponse::Proceed,
        }
    }

    /// The platform only goes ahead with the click if the holder took it
    fn write(&mut self, owner: &PlayerId, clicker: &P, changes: &[SlotChange]) -> EventResponse {
        match self.container.apply_changes(owner, clicker, changes) {
            HandlerOutcome::Success => EventResponse::Proceed,
            _ => EventResponse::Cancel,
        }
    }

    /// Run everything deferred before this call, in order. Work deferred while
    /// running waits for the following tick.
    pub fn tick(&mut self) -> Vec<(PlayerId, HandlerOutcome)> {
        let due = std::mem::take(&mut self.deferred);
        due.into_iter()
            .map(|task| match task {
                Deferred::Open(player) => {
                    let outcome = self.container.open(player.id(), &player);
                    (player.id().clone(), outcome)
                }
            })
            .collect()
    }
}
