//! Keyboard shortcut mapping.
//!
//! Active for as long as the editor is mounted:
//! - `Delete` removes the active selection
//! - `d` duplicates the active selection (images only)

use serde::{Deserialize, Serialize};

/// Actions keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShortcutAction {
    /// Remove the active selection.
    Delete,
    /// Duplicate the active selection.
    Duplicate,
}

/// Resolves key names into shortcut actions.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a `KeyboardEvent.key` value to an action.
    ///
    /// Matching is exact: `"D"` (shift held) is not a duplicate.
    #[must_use]
    pub fn resolve(key: &str) -> Option<ShortcutAction> {
        match key {
            "Delete" => Some(ShortcutAction::Delete),
            "d" => Some(ShortcutAction::Duplicate),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_bound_keys() {
        assert_eq!(ShortcutMap::resolve("Delete"), Some(ShortcutAction::Delete));
        assert_eq!(ShortcutMap::resolve("d"), Some(ShortcutAction::Duplicate));
    }

    #[test]
    fn test_resolve_unbound_keys() {
        assert_eq!(ShortcutMap::resolve("D"), None);
        assert_eq!(ShortcutMap::resolve("Backspace"), None);
        assert_eq!(ShortcutMap::resolve(""), None);
    }
}
