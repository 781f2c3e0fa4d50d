//! `/biginv see` and `/biginv backup`.
//!
//! Commands return the line to show the sender, already prefixed. Argument
//! errors come back as [`CommandError`], which renders through the configured
//! messages with [`CommandError::message`].

use crate::config::Messages;
use crate::container::{Container, HandlerOutcome};
use crate::host::Host;
use crate::principal::Principal;
use crate::store::PlayerStore;

pub const SEE_PARAMS: &str = "[player]";
pub const BACKUP_PARAMS: &str = "[player] [target]";

/// Who ran the command
#[derive(Debug)]
pub enum CommandSender<'a, P> {
    Console,
    Player(&'a P),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("usage: /biginv {sub} {params}")]
    Usage {
        sub: &'static str,
        params: &'static str,
    },

    #[error("/biginv {0} can only be used by players")]
    PlayerOnly(&'static str),

    #[error("unknown sub-command: {0}")]
    UnknownSubCommand(String),
}

impl CommandError {
    /// Line to show the sender
    pub fn message(&self, messages: &Messages) -> String {
        match self {
            CommandError::Usage { sub, params } => {
                messages.prefixed(&format!("{} /biginv {} {}", messages.usage, sub, params))
            }
            CommandError::PlayerOnly(_) => messages.prefixed(&messages.console_error),
            CommandError::UnknownSubCommand(_) => messages.prefixed(&format!(
                "{} /biginv <see {} | backup {}>",
                messages.usage, SEE_PARAMS, BACKUP_PARAMS
            )),
        }
    }
}

/// Dispatch `/biginv <sub> [args..]`. `lookup` finds an online player by name.
pub fn execute<S, H, P, F>(
    container: &mut Container<S, H>,
    sender: CommandSender<'_, P>,
    args: &[&str],
    lookup: F,
) -> Result<Option<String>, CommandError>
where
    S: PlayerStore,
    H: Host,
    P: Principal + Clone,
    F: Fn(&str) -> Option<P>,
{
    match args.split_first() {
        Some((&"see", rest)) => see(container, sender, rest, lookup),
        Some((&"backup", rest)) => backup(container, sender, rest, lookup),
        Some((other, _)) => Err(CommandError::UnknownSubCommand(other.to_string())),
        None => Err(CommandError::UnknownSubCommand(String::new())),
    }
}

/// `see [player]`: open a BigInv for the sender. Players only.
pub fn see<S, H, P, F>(
    container: &mut Container<S, H>,
    sender: CommandSender<'_, P>,
    args: &[&str],
    lookup: F,
) -> Result<Option<String>, CommandError>
where
    S: PlayerStore,
    H: Host,
    P: Principal + Clone,
    F: Fn(&str) -> Option<P>,
{
    let CommandSender::Player(viewer) = sender else {
        return Err(CommandError::PlayerOnly("see"));
    };
    let messages = container.messages().clone();
    if !viewer.has_permission(&container.permissions().see) {
        return Ok(Some(messages.prefixed(&messages.no_permission)));
    }

    let owner = match args {
        [] => viewer.id().clone(),
        [name] => match lookup(name) {
            Some(p) => p.id().clone(),
            None => return Ok(Some(messages.prefixed(&messages.no_player))),
        },
        _ => {
            return Err(CommandError::Usage {
                sub: "see",
                params: SEE_PARAMS,
            })
        }
    };

    let reply = match container.open(&owner, viewer) {
        HandlerOutcome::NoPermission => Some(&messages.no_permission),
        HandlerOutcome::NoData | HandlerOutcome::NoHolder => Some(&messages.see_no_data),
        _ => None,
    };
    Ok(reply.map(|m| messages.prefixed(m)))
}

/// `backup [player] [target]`: give `player`'s backup to `target`.
///
/// Both default to the sender; the console has to name both.
pub fn backup<S, H, P, F>(
    container: &mut Container<S, H>,
    sender: CommandSender<'_, P>,
    args: &[&str],
    lookup: F,
) -> Result<Option<String>, CommandError>
where
    S: PlayerStore,
    H: Host,
    P: Principal + Clone,
    F: Fn(&str) -> Option<P>,
{
    let messages = container.messages().clone();
    if args.len() > 2 {
        return Err(CommandError::Usage {
            sub: "backup",
            params: BACKUP_PARAMS,
        });
    }

    let sender = match sender {
        CommandSender::Console if args.len() < 2 => {
            return Ok(Some(messages.prefixed(&messages.console_error)));
        }
        CommandSender::Console => None,
        CommandSender::Player(p) => {
            if !p.has_permission(&container.permissions().backup) {
                return Ok(Some(messages.prefixed(&messages.no_permission)));
            }
            Some(p)
        }
    };

    let (owner, target) = match (args, sender) {
        ([], Some(p)) => (p.clone(), p.clone()),
        ([owner], Some(p)) => match lookup(owner) {
            Some(owner) => (owner, p.clone()),
            None => return Ok(Some(messages.prefixed(&messages.no_player))),
        },
        ([owner, target], _) => match (lookup(owner), lookup(target)) {
            (Some(owner), Some(target)) => (owner, target),
            _ => return Ok(Some(messages.prefixed(&messages.no_player))),
        },
        _ => return Ok(Some(messages.prefixed(&messages.console_error))),
    };

    let outcome = container.restore_backup(owner.id(), &target);
    tracing::debug!(
        "[biginv] [cmd] backup owner={} target={} outcome={:?}",
        owner.id(),
        target.id(),
        outcome
    );
    let reply = match outcome {
        HandlerOutcome::NoPermission => &messages.no_permission,
        HandlerOutcome::PartialSuccess => &messages.backup_partial_success,
        HandlerOutcome::Success => &messages.backup_success,
        HandlerOutcome::NoData | HandlerOutcome::NoHolder => &messages.backup_no_data,
        HandlerOutcome::NeededBackup => &messages.internal_error,
    };
    Ok(Some(messages.prefixed(reply)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InvConfig;
    use crate::host::RecordingHost;
    use crate::inventory::{ItemSet, ItemStack};
    use crate::principal::{PlayerId, Player};
    use crate::store::{MemoryStore, PlayerDocument};

    fn alice() -> Player {
        Player::new("alice-id", "alice")
            .with_permission("biginv.see")
            .with_permission("biginv.backup")
    }

    fn bob() -> Player {
        Player::new("bob-id", "bob").with_permission("biginv.backup")
    }

    fn lookup(name: &str) -> Option<Player> {
        match name {
            "alice" => Some(alice()),
            "bob" => Some(bob()),
            _ => None,
        }
    }

    fn container() -> Container<MemoryStore, RecordingHost> {
        let mut c = Container::new(
            &InvConfig::default(),
            Box::new(|_: &dyn Principal| 9usize),
            MemoryStore::new(),
            RecordingHost::new(),
        );
        c.store_mut().insert(
            PlayerId::new("alice-id"),
            PlayerDocument {
                active: Some(ItemSet::new(9)),
                backup: Some(ItemSet::from_items(vec![ItemStack::new("GOLD_BLOCK", 2)])),
                saved_at: None,
            },
        );
        c.load(&alice());
        c.load(&bob());
        c
    }

    #[test]
    fn see_opens_own_inventory_silently() {
        let mut c = container();
        let reply = execute(&mut c, CommandSender::Player(&alice()), &["see"], lookup).unwrap();
        assert_eq!(reply, None);
        assert_eq!(c.host().opened.len(), 1);
    }

    #[test]
    fn see_other_needs_other_permission() {
        let mut c = container();
        let reply = see(&mut c, CommandSender::Player(&alice()), &["bob"], lookup).unwrap();
        assert_eq!(reply.as_deref(), Some("[BigInv] You do not have permission."));
    }

    #[test]
    fn see_unknown_player() {
        let mut c = container();
        let reply = see(&mut c, CommandSender::Player(&alice()), &["carol"], lookup).unwrap();
        assert_eq!(
            reply.as_deref(),
            Some("[BigInv] There is no player with this name online.")
        );
    }

    #[test]
    fn see_from_console_is_refused() {
        let mut c = container();
        let err = see(&mut c, CommandSender::<Player>::Console, &[], lookup).unwrap_err();
        assert_eq!(err, CommandError::PlayerOnly("see"));
    }

    #[test]
    fn backup_to_self() {
        let mut c = container();
        let reply = backup(&mut c, CommandSender::Player(&alice()), &[], lookup).unwrap();
        assert_eq!(reply.as_deref(), Some("[BigInv] Backup restoring was successful."));
        assert_eq!(c.host().given[0].0, PlayerId::new("alice-id"));

        let again = backup(&mut c, CommandSender::Player(&alice()), &[], lookup).unwrap();
        assert_eq!(again.as_deref(), Some("[BigInv] There is no backup available"));
    }

    #[test]
    fn console_must_name_owner_and_target() {
        let mut c = container();
        let reply = backup(&mut c, CommandSender::<Player>::Console, &["alice"], lookup).unwrap();
        assert_eq!(
            reply.as_deref(),
            Some("[BigInv] All values must be specified if command is performed via console.")
        );
    }

    #[test]
    fn target_needs_other_permission() {
        let mut c = container();
        let reply =
            backup(&mut c, CommandSender::<Player>::Console, &["alice", "bob"], lookup).unwrap();
        assert_eq!(reply.as_deref(), Some("[BigInv] You do not have permission."));
        assert!(c.host().given.is_empty());
    }

    #[test]
    fn partial_restore_message() {
        let mut c = container();
        c.host_mut().give_limit = Some(0);
        let reply =
            backup(&mut c, CommandSender::<Player>::Console, &["alice", "alice"], lookup).unwrap();
        assert_eq!(
            reply.as_deref(),
            Some("[BigInv] Added items to inventory, but there are still items left in the backup.")
        );
    }

    #[test]
    fn too_many_args_is_usage() {
        let mut c = container();
        let err = execute(
            &mut c,
            CommandSender::Player(&alice()),
            &["backup", "a", "b", "c"],
            lookup,
        )
        .unwrap_err();
        let line = err.message(c.messages());
        assert_eq!(line, "[BigInv] Usage: /biginv backup [player] [target]");
    }

    #[test]
    fn unknown_sub_command() {
        let mut c = container();
        let err = execute(&mut c, CommandSender::Player(&alice()), &["dance"], lookup).unwrap_err();
        assert_eq!(err, CommandError::UnknownSubCommand("dance".to_string()));
    }
}
