use crate::mappings::KeyNameToKeysym;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Маски модификаторов X11 (поле `state` в KeyPress)
pub const SHIFT_MASK: u16 = 1 << 0;
pub const LOCK_MASK: u16 = 1 << 1;
pub const CONTROL_MASK: u16 = 1 << 2;
pub const MOD1_MASK: u16 = 1 << 3;
pub const MOD2_MASK: u16 = 1 << 4;
pub const MOD4_MASK: u16 = 1 << 6;

/// Биты CapsLock и NumLock, которые не должны влиять на сопоставление хоткеев
pub const IGNORED_LOCK_MASKS: [u16; 4] = [0, LOCK_MASK, MOD2_MASK, LOCK_MASK | MOD2_MASK];

/// Символ клавиши X11 (keysym)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Keysym(pub u32);

impl Keysym {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn name(&self) -> Option<&'static str> {
        KeyNameToKeysym::reverse_translate(self.0)
    }
}

impl fmt::Display for Keysym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "keysym 0x{:x}", self.0),
        }
    }
}

/// Модификаторы клавиш
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub super_key: bool,
}

impl Modifiers {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn with_ctrl(mut self, ctrl: bool) -> Self {
        self.ctrl = ctrl;
        self
    }

    #[allow(dead_code)]
    pub fn with_alt(mut self, alt: bool) -> Self {
        self.alt = alt;
        self
    }

    #[allow(dead_code)]
    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }

    #[allow(dead_code)]
    pub fn with_super(mut self, super_key: bool) -> Self {
        self.super_key = super_key;
        self
    }

    pub fn is_empty(&self) -> bool {
        !self.ctrl && !self.alt && !self.shift && !self.super_key
    }

    pub fn to_vec(&self) -> Vec<String> {
        let mut result = Vec::new();
        if self.ctrl { result.push("ctrl".to_string()); }
        if self.alt { result.push("alt".to_string()); }
        if self.shift { result.push("shift".to_string()); }
        if self.super_key { result.push("super".to_string()); }
        result
    }

    pub fn from_vec(modifiers: &[String]) -> Self {
        let mut result = Self::new();
        for modifier in modifiers {
            match modifier.as_str() {
                "ctrl" => result.ctrl = true,
                "alt" => result.alt = true,
                "shift" => result.shift = true,
                "super" => result.super_key = true,
                _ => {}
            }
        }
        result
    }

    /// Маска модификаторов в кодировке X11
    pub fn to_mask(&self) -> u16 {
        let mut mask = 0;
        if self.shift { mask |= SHIFT_MASK; }
        if self.ctrl { mask |= CONTROL_MASK; }
        if self.alt { mask |= MOD1_MASK; }
        if self.super_key { mask |= MOD4_MASK; }
        mask
    }

    /// Разобрать поле `state` события; биты CapsLock/NumLock игнорируются
    pub fn from_mask(mask: u16) -> Self {
        Self {
            ctrl: mask & CONTROL_MASK != 0,
            alt: mask & MOD1_MASK != 0,
            shift: mask & SHIFT_MASK != 0,
            super_key: mask & MOD4_MASK != 0,
        }
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modifiers = self.to_vec();
        if modifiers.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", modifiers.join("+"))
        }
    }
}

/// Комбинация, которую оконный менеджер перехватывает глобально
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyGrab {
    pub keysym: Keysym,
    pub modifiers: Modifiers,
}

impl fmt::Display for KeyGrab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.modifiers, self.keysym)
    }
}

/// Событие нажатия перехваченной клавиши
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub keysym: Keysym,
    pub modifiers: Modifiers,
    pub timestamp: std::time::Instant,
}

impl KeyEvent {
    pub fn new(keysym: Keysym, modifiers: Modifiers) -> Self {
        Self {
            keysym,
            modifiers,
            timestamp: std::time::Instant::now(),
        }
    }

    /// Получить идентификатор комбинации клавиш для логов
    pub fn combination_id(&self) -> String {
        if self.modifiers.is_empty() {
            format!("{}", self.keysym)
        } else {
            format!("{}+{}", self.modifiers, self.keysym)
        }
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}ms ago)",
            self.combination_id(),
            self.timestamp.elapsed().as_millis()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifiers_mask_roundtrip_ignores_locks() {
        let modifiers = Modifiers::new().with_super(true).with_shift(true);
        let mask = modifiers.to_mask();
        assert_eq!(mask, MOD4_MASK | SHIFT_MASK);

        for lock in IGNORED_LOCK_MASKS {
            assert_eq!(Modifiers::from_mask(mask | lock), modifiers);
        }
    }

    #[test]
    fn test_modifiers_from_vec_skips_unknown() {
        let modifiers = Modifiers::from_vec(&["super".to_string(), "hyper".to_string()]);
        assert!(modifiers.super_key);
        assert!(!modifiers.ctrl);
        assert_eq!(modifiers.to_vec(), vec!["super".to_string()]);
    }

    #[test]
    fn test_key_event_combination_id() {
        let plain = KeyEvent::new(Keysym(0x71), Modifiers::new());
        let with_super = KeyEvent::new(Keysym(0x71), Modifiers::new().with_super(true));

        assert_eq!(plain.combination_id(), "q");
        assert_eq!(with_super.combination_id(), "super+q");
        assert_eq!(Keysym(0x1234_5678).to_string(), "keysym 0x12345678");
    }
}
