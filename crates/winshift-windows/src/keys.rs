use winshift_core::hotkey::{KeyCombo, Modifier};
use winshift_core::{Error, Result};

/// `RegisterHotKey` modifier flags. Plain values so this module builds
/// and tests on every platform.
pub const MOD_ALT: u32 = 0x0001;
pub const MOD_CONTROL: u32 = 0x0002;
pub const MOD_SHIFT: u32 = 0x0004;
pub const MOD_WIN: u32 = 0x0008;
pub const MOD_NOREPEAT: u32 = 0x4000;

/// Converts a key name string to a Windows virtual key code.
///
/// Supports letters (A–Z), digits (0–9), function keys (F1–F24),
/// numpad digits and common named keys (Enter, Space, Tab, etc.).
/// Matching is case-insensitive.
pub fn vk_from_name(name: &str) -> Option<u32> {
    let upper = name.to_ascii_uppercase();

    if upper.len() == 1 {
        let ch = upper.as_bytes()[0];
        if ch.is_ascii_uppercase() || ch.is_ascii_digit() {
            return Some(u32::from(ch));
        }
    }

    // VK_F1 = 0x70
    if let Some(rest) = upper.strip_prefix('F')
        && let Ok(n) = rest.parse::<u32>()
        && (1..=24).contains(&n)
    {
        return Some(0x70 + n - 1);
    }

    // VK_NUMPAD0 = 0x60
    if let Some(rest) = upper.strip_prefix("NUM")
        && let Ok(n) = rest.parse::<u32>()
        && n <= 9
    {
        return Some(0x60 + n);
    }

    match upper.as_str() {
        "ENTER" | "RETURN" => Some(0x0D),
        "TAB" => Some(0x09),
        "ESCAPE" | "ESC" => Some(0x1B),
        "SPACE" => Some(0x20),
        "BACKSPACE" => Some(0x08),
        "DELETE" | "DEL" => Some(0x2E),
        "INSERT" | "INS" => Some(0x2D),
        "HOME" => Some(0x24),
        "END" => Some(0x23),
        "PAGEUP" | "PGUP" => Some(0x21),
        "PAGEDOWN" | "PGDN" => Some(0x22),
        "PAUSE" => Some(0x13),
        "PRINTSCREEN" | "PRTSC" => Some(0x2C),

        "LEFT" => Some(0x25),
        "UP" => Some(0x26),
        "RIGHT" => Some(0x27),
        "DOWN" => Some(0x28),

        "MINUS" => Some(0xBD),
        "PLUS" | "EQUALS" => Some(0xBB),
        "COMMA" => Some(0xBC),
        "PERIOD" | "DOT" => Some(0xBE),
        "SLASH" => Some(0xBF),
        "SEMICOLON" => Some(0xBA),
        "BACKSLASH" => Some(0xDC),
        "LBRACKET" => Some(0xDB),
        "RBRACKET" => Some(0xDD),
        "QUOTE" => Some(0xDE),
        "BACKTICK" | "GRAVE" => Some(0xC0),

        _ => None,
    }
}

fn modifier_flag(modifier: Modifier) -> u32 {
    match modifier {
        Modifier::Alt => MOD_ALT,
        Modifier::Shift => MOD_SHIFT,
        Modifier::Ctrl => MOD_CONTROL,
        Modifier::Win => MOD_WIN,
    }
}

/// Resolves a combo to `(modifier flags, virtual key)` for `RegisterHotKey`.
///
/// `MOD_NOREPEAT` is always set so holding the keys fires once.
pub fn resolve(combo: &KeyCombo) -> Result<(u32, u32)> {
    let vk = vk_from_name(&combo.key).ok_or_else(|| Error::InvalidHotkey {
        spec: combo.to_string(),
        reason: format!("unknown key name {:?}", combo.key),
    })?;

    let modifiers = combo
        .modifiers
        .iter()
        .fold(MOD_NOREPEAT, |flags, m| flags | modifier_flag(*m));

    Ok((modifiers, vk))
}
