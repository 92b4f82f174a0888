use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Преобразование имён клавиш в X11 keysym и обратно
/// Отвечает за трансляцию имён из конфигурации в числовые коды X11
pub struct KeyNameToKeysym;

// Keysym для латиницы и цифр совпадает с ASCII-кодом
static KEY_NAME_TO_KEYSYM: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
    let mut map = HashMap::new();

    // Буквенные клавиши (XK_a..XK_z)
    const LETTERS: [&str; 26] = [
        "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m",
        "n", "o", "p", "q", "r", "s", "t", "u", "v", "w", "x", "y", "z",
    ];
    for (i, name) in LETTERS.iter().enumerate() {
        map.insert(*name, 0x61 + i as u32);
    }

    // Цифровые клавиши (XK_0..XK_9)
    const DIGITS: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];
    for (i, name) in DIGITS.iter().enumerate() {
        map.insert(*name, 0x30 + i as u32);
    }

    // Специальные клавиши
    map.insert("space", 0x0020);      // XK_space
    map.insert("enter", 0xff0d);      // XK_Return
    map.insert("escape", 0xff1b);     // XK_Escape
    map.insert("backspace", 0xff08);  // XK_BackSpace
    map.insert("tab", 0xff09);        // XK_Tab
    map.insert("delete", 0xffff);     // XK_Delete

    // Знаки пунктуации
    map.insert("minus", 0x002d);      // XK_minus
    map.insert("equal", 0x003d);      // XK_equal
    map.insert("comma", 0x002c);      // XK_comma
    map.insert("period", 0x002e);     // XK_period
    map.insert("slash", 0x002f);      // XK_slash
    map.insert("semicolon", 0x003b);  // XK_semicolon
    map.insert("grave", 0x0060);      // XK_grave

    // Функциональные клавиши (XK_F1..XK_F12)
    const FUNCTION_KEYS: [&str; 12] = [
        "f1", "f2", "f3", "f4", "f5", "f6", "f7", "f8", "f9", "f10", "f11", "f12",
    ];
    for (i, name) in FUNCTION_KEYS.iter().enumerate() {
        map.insert(*name, 0xffbe + i as u32);
    }

    map
});

static KEYSYM_TO_KEY_NAME: Lazy<HashMap<u32, &'static str>> = Lazy::new(|| {
    KEY_NAME_TO_KEYSYM.iter().map(|(&name, &keysym)| (keysym, name)).collect()
});

impl KeyNameToKeysym {
    /// Получить keysym по имени клавиши (регистр не важен)
    pub fn translate(key_name: &str) -> Result<u32, String> {
        let normalized = key_name.to_lowercase();
        KEY_NAME_TO_KEYSYM
            .get(normalized.as_str())
            .copied()
            .ok_or_else(|| format!("Unknown key: {}", key_name))
    }

    /// Получить имя клавиши по keysym
    pub fn reverse_translate(keysym: u32) -> Option<&'static str> {
        KEYSYM_TO_KEY_NAME.get(&keysym).copied()
    }

    /// Keysym цифровой клавиши верхнего ряда
    pub fn digit(n: u8) -> u32 {
        0x30 + u32::from(n % 10)
    }

    /// Цифра 1..=9 для keysym верхнего ряда
    pub fn to_digit(keysym: u32) -> Option<u8> {
        match keysym {
            0x31..=0x39 => Some((keysym - 0x30) as u8),
            _ => None,
        }
    }

    /// Проверить, является ли имя модификатором
    pub fn is_modifier(key_name: &str) -> bool {
        let normalized = key_name.to_lowercase();
        matches!(normalized.as_str(), "ctrl" | "alt" | "shift" | "super")
    }
}
