//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic [`ShortcutAction`]s. `key` is the
//! host's key name (`"z"`, `"Delete"`, `"Escape"`).

use crate::input::Modifiers;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Edit ──
    Delete,
    Undo,
    Save,

    // ── View ──
    ZoomIn,
    ZoomOut,
    ZoomReset,

    /// Abandon an in-progress arrow, or drop the selection.
    Cancel,
}

/// Resolves key events into shortcut actions.
///
/// `ctrl` and `meta` are interchangeable so the same bindings work with ⌘
/// on macOS and Ctrl elsewhere.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Returns `None` if the combo has no binding.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        if modifiers.command() {
            return match key {
                "z" | "Z" if !modifiers.shift => Some(ShortcutAction::Undo),
                "s" | "S" => Some(ShortcutAction::Save),
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                "0" => Some(ShortcutAction::ZoomReset),
                _ => None,
            };
        }

        match key {
            // Backspace stays with the text field the host may have focused.
            "Delete" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Cancel),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CMD: Modifiers = Modifiers {
        meta: true,
        ..Modifiers::NONE
    };

    #[test]
    fn ctrl_and_meta_are_equivalent() {
        assert_eq!(ShortcutMap::resolve("z", Modifiers::CTRL), Some(ShortcutAction::Undo));
        assert_eq!(ShortcutMap::resolve("z", CMD), Some(ShortcutAction::Undo));
        assert_eq!(ShortcutMap::resolve("s", CMD), Some(ShortcutAction::Save));
    }

    #[test]
    fn zoom_bindings() {
        assert_eq!(ShortcutMap::resolve("=", Modifiers::CTRL), Some(ShortcutAction::ZoomIn));
        assert_eq!(ShortcutMap::resolve("+", Modifiers::CTRL), Some(ShortcutAction::ZoomIn));
        assert_eq!(ShortcutMap::resolve("-", Modifiers::CTRL), Some(ShortcutAction::ZoomOut));
        assert_eq!(ShortcutMap::resolve("0", Modifiers::CTRL), Some(ShortcutAction::ZoomReset));
        // Without a command modifier these are plain typing.
        assert_eq!(ShortcutMap::resolve("0", Modifiers::NONE), None);
    }

    #[test]
    fn bare_keys() {
        assert_eq!(ShortcutMap::resolve("Delete", Modifiers::NONE), Some(ShortcutAction::Delete));
        assert_eq!(ShortcutMap::resolve("Backspace", Modifiers::NONE), None);
        assert_eq!(ShortcutMap::resolve("Escape", Modifiers::NONE), Some(ShortcutAction::Cancel));
        assert_eq!(ShortcutMap::resolve("z", Modifiers::NONE), None);
    }

    #[test]
    fn shift_undo_is_unbound() {
        let mods = Modifiers {
            shift: true,
            ..Modifiers::CTRL
        };
        assert_eq!(ShortcutMap::resolve("z", mods), None);
    }
}
