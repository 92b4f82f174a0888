use super::keyboard::KeyEvent;
use std::fmt;

/// Идентификатор окна, выданный X-сервером.
/// Менеджер хранит его по значению и никогда не владеет окном.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WindowId(pub u32);

impl WindowId {
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Размер экрана в пикселях
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: u16,
    pub height: u16,
}

/// Геометрия окна
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub border_width: u32,
}

impl WindowGeometry {
    /// Весь экран за вычетом полосы под бар сверху, без рамки
    pub fn below_bar(screen: ScreenSize, bar_height: u32) -> Self {
        let height = u32::from(screen.height).saturating_sub(bar_height).max(1);
        Self {
            x: 0,
            y: bar_height as i32,
            width: u32::from(screen.width),
            height,
            border_width: 0,
        }
    }
}

impl fmt::Display for WindowGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Атрибуты окна, важные для классификации
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowAttributes {
    pub override_redirect: bool,
}

/// Первое значение `_NET_WM_WINDOW_TYPE`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowType {
    Dock,
    Other(u32),
}

/// Содержимое `WM_CLASS`: имя ресурса и класс
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassHint {
    pub instance: String,
    pub class: String,
}

impl ClassHint {
    pub fn new(instance: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            class: class.into(),
        }
    }

    /// `WM_CLASS` хранится как две строки, разделённые NUL
    pub fn parse(raw: &[u8]) -> Option<Self> {
        let mut parts = raw.split(|&b| b == 0);
        let instance = parts.next().filter(|p| !p.is_empty())?;
        let class = parts.next().unwrap_or_default();
        Some(Self {
            instance: String::from_utf8_lossy(instance).into_owned(),
            class: String::from_utf8_lossy(class).into_owned(),
        })
    }
}

/// События X-сервера, на которые реагирует менеджер
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WmEvent {
    /// Клиент просит показать окно (MapRequest)
    MapRequest(WindowId),
    /// Окно уничтожено (DestroyNotify)
    DestroyNotify(WindowId),
    /// Нажата перехваченная комбинация
    KeyPress(KeyEvent),
    /// Всё остальное, включая асинхронные ошибки протокола
    Ignored,
}

impl fmt::Display for WmEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WmEvent::MapRequest(window) => write!(f, "MapRequest {}", window),
            WmEvent::DestroyNotify(window) => write!(f, "DestroyNotify {}", window),
            WmEvent::KeyPress(key) => write!(f, "KeyPress {}", key),
            WmEvent::Ignored => write!(f, "Ignored"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_leaves_room_for_bar() {
        let screen = ScreenSize { width: 1920, height: 1080 };
        let geometry = WindowGeometry::below_bar(screen, 24);

        assert_eq!(geometry.x, 0);
        assert_eq!(geometry.y, 24);
        assert_eq!(geometry.width, 1920);
        assert_eq!(geometry.height, 1056);
        assert_eq!(geometry.border_width, 0);
    }

    #[test]
    fn test_class_hint_parsing() {
        let hint = ClassHint::parse(b"lemonbar\0Bar\0").unwrap();
        assert_eq!(hint, ClassHint::new("lemonbar", "Bar"));

        let instance_only = ClassHint::parse(b"bar").unwrap();
        assert_eq!(instance_only.instance, "bar");
        assert_eq!(instance_only.class, "");

        assert!(ClassHint::parse(b"").is_none());
        assert!(ClassHint::parse(b"\0Firefox\0").is_none());
    }

    #[test]
    fn test_window_id_display() {
        assert_eq!(WindowId(0x1a00003).to_string(), "0x1a00003");
    }
}
