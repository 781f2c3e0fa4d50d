//! Capacity resolution: how many BigInv slots a principal may use right now.

use crate::config::Permissions;
use crate::principal::Principal;

/// Slots per row of a storage view
pub const ROW_WIDTH: usize = 9;

/// Largest number of rows a storage view can show
pub const MAX_ROWS: usize = 6;

/// Maps a principal to an allowed storage size in slots.
///
/// Implementations must return a multiple of [`ROW_WIDTH`]. 0 means the
/// principal has no BigInv. The result is never cached by callers; it is asked
/// for again on every load.
pub trait CapacityResolver {
    fn resolve(&self, principal: &dyn Principal) -> usize;
}

impl<F> CapacityResolver for F
where
    F: Fn(&dyn Principal) -> usize,
{
    fn resolve(&self, principal: &dyn Principal) -> usize {
        self(principal)
    }
}

/// Permission-backed resolver: `<prefix>*` grants `max_rows` rows, otherwise
/// the highest `<prefix><n>` held wins.
#[derive(Debug, Clone)]
pub struct PermissionCapacity {
    prefix: String,
    max_rows: usize,
}

impl PermissionCapacity {
    pub fn new(prefix: impl Into<String>, max_rows: usize) -> Self {
        Self {
            prefix: prefix.into(),
            max_rows,
        }
    }

    pub fn from_permissions(permissions: &Permissions, max_rows: usize) -> Self {
        Self::new(permissions.size_prefix.clone(), max_rows)
    }
}

impl CapacityResolver for PermissionCapacity {
    fn resolve(&self, principal: &dyn Principal) -> usize {
        if principal.has_permission(&format!("{}*", self.prefix)) {
            return self.max_rows * ROW_WIDTH;
        }
        (0..=self.max_rows)
            .rev()
            .find(|rows| principal.has_permission(&format!("{}{}", self.prefix, rows)))
            .map_or(0, |rows| rows * ROW_WIDTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::principal::Player;

    fn resolver() -> PermissionCapacity {
        PermissionCapacity::from_permissions(&Permissions::default(), MAX_ROWS)
    }

    #[test]
    fn no_grant_is_zero() {
        let p = Player::new("a", "a");
        assert_eq!(resolver().resolve(&p), 0);
    }

    #[test]
    fn wildcard_wins() {
        let p = Player::new("a", "a")
            .with_permission("biginv.size.1")
            .with_permission("biginv.size.*");
        assert_eq!(resolver().resolve(&p), 54);
    }

    #[test]
    fn highest_row_grant_wins() {
        let p = Player::new("a", "a")
            .with_permission("biginv.size.2")
            .with_permission("biginv.size.4");
        assert_eq!(resolver().resolve(&p), 36);
    }

    #[test]
    fn grants_above_max_rows_are_ignored() {
        let p = Player::new("a", "a").with_permission("biginv.size.9");
        assert_eq!(resolver().resolve(&p), 0);

        let capped = PermissionCapacity::new("biginv.size.", 3);
        let p = Player::new("a", "a").with_permission("biginv.size.*");
        assert_eq!(capped.resolve(&p), 27);
    }

    #[test]
    fn explicit_zero_rows() {
        let p = Player::new("a", "a").with_permission("biginv.size.0");
        assert_eq!(resolver().resolve(&p), 0);
    }

    #[test]
    fn closures_are_resolvers() {
        let fixed = |_: &dyn Principal| 18usize;
        assert_eq!(fixed.resolve(&Player::new("a", "a")), 18);
    }
}
