//! BigInv - oversized per-player inventories
//!
//! Gives every player a storage inventory sized by permission, and keeps the
//! items that no longer fit in a per-player backup instead of dropping them.
//! The hosting platform drives it through [`listeners::EventRouter`] and the
//! [`host::Host`] trait.

// ============================================
// Core Modules
// ============================================

/// Plugin configuration (permissions, messages, store backend)
pub mod config;
/// Permission-backed storage sizing
pub mod capacity;
/// Player identity and permission queries
pub mod principal;
/// Items, item sets, overflow split and backup merge
pub mod inventory;
/// Live per-owner storage
pub mod holder;
/// Player document persistence (YAML files, MySQL, memory)
pub mod store;

// ============================================
// Platform Integration
// ============================================

/// Calls out to the hosting platform
pub mod host;
/// Registry of loaded holders and their lifecycle
pub mod container;
/// Inbound events and the deferred task queue
pub mod listeners;
/// `/biginv see` and `/biginv backup`
pub mod commands;

pub use container::{Container, HandlerOutcome};
pub use host::{Host, Notice};
pub use principal::{Player, PlayerId, Principal};
