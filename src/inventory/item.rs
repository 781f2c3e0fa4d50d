//! Item stacks as stored in a BigInv slot.

use serde::{Deserialize, Serialize};

/// A single stack of items occupying one slot.
///
/// The fields mirror what the host platform round-trips through the player
/// documents; anything the platform does not expose here is not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// Platform material / item type id (e.g. `"DIAMOND_SWORD"`).
    pub kind: String,

    #[serde(default = "default_amount")]
    pub amount: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lore: Vec<String>,
}

fn default_amount() -> u32 {
    1
}

impl ItemStack {
    /// Create a plain stack with no display name or lore
    pub fn new(kind: impl Into<String>, amount: u32) -> Self {
        Self {
            kind: kind.into(),
            amount,
            display_name: None,
            lore: Vec::new(),
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_lore(mut self, line: impl Into<String>) -> Self {
        self.lore.push(line.into());
        self
    }
}

/// One storage slot. `None` is an empty slot.
pub type Slot = Option<ItemStack>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_defaults_to_one() {
        let item: ItemStack = serde_yaml::from_str("kind: STONE").unwrap();
        assert_eq!(item.amount, 1);
        assert_eq!(item.display_name, None);
        assert!(item.lore.is_empty());
    }

    #[test]
    fn optional_fields_are_omitted() {
        let yaml = serde_yaml::to_string(&ItemStack::new("DIRT", 64)).unwrap();
        assert!(yaml.contains("kind: DIRT"));
        assert!(yaml.contains("amount: 64"));
        assert!(!yaml.contains("display_name"));
        assert!(!yaml.contains("lore"));
    }

    #[test]
    fn builder_sets_meta() {
        let item = ItemStack::new("DIAMOND_SWORD", 1)
            .with_display_name("Excalibur")
            .with_lore("Pulled from a stone");
        assert_eq!(item.display_name.as_deref(), Some("Excalibur"));
        assert_eq!(item.lore, vec!["Pulled from a stone".to_string()]);
    }
}
