use crate::events::{WindowId, WindowType};
use crate::services::window_server::WindowServer;
use tracing::debug;

/// Решение по новому окну
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowClass {
    /// override-redirect: окно само управляет своим размещением
    Ignored,
    /// Бар или док: показывается сразу и в реестр не попадает
    Dock,
    Manageable,
}

/// Классификатор окон по override-redirect, `_NET_WM_WINDOW_TYPE` и `WM_CLASS`.
///
/// Неудачные запросы свойств трактуются как «не док» и никогда не
/// останавливают обработку событий.
pub struct WindowClassifier {
    dock_names: Vec<String>,
}

impl WindowClassifier {
    pub fn new(dock_names: Vec<String>) -> Self {
        Self { dock_names }
    }

    pub fn classify<S: WindowServer + ?Sized>(&self, server: &mut S, window: WindowId) -> WindowClass {
        let override_redirect = match server.attributes(window) {
            Ok(attributes) => attributes.override_redirect,
            Err(e) => {
                debug!("Атрибуты окна {} недоступны: {}", window, e);
                false
            }
        };

        if override_redirect {
            return WindowClass::Ignored;
        }

        if self.is_dock(server, window) {
            WindowClass::Dock
        } else {
            WindowClass::Manageable
        }
    }

    fn is_dock<S: WindowServer + ?Sized>(&self, server: &mut S, window: WindowId) -> bool {
        match server.window_type(window) {
            Ok(Some(WindowType::Dock)) => return true,
            Ok(_) => {}
            Err(e) => debug!("_NET_WM_WINDOW_TYPE окна {} недоступен: {}", window, e),
        }

        match server.class_hint(window) {
            // Сравнение точное и регистрозависимое
            Ok(Some(hint)) => self.dock_names.iter().any(|name| *name == hint.instance),
            Ok(None) => false,
            Err(e) => {
                debug!("WM_CLASS окна {} недоступен: {}", window, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ScreenSize;
    use crate::services::window_server::{DryRunServer, FakeWindow};

    fn classifier() -> WindowClassifier {
        WindowClassifier::new(vec!["lemonbar".to_string(), "bar".to_string()])
    }

    fn server_with(window: WindowId, fake: FakeWindow) -> DryRunServer {
        let mut server = DryRunServer::new(ScreenSize { width: 800, height: 600 });
        server.add_window(window, fake);
        server
    }

    #[test]
    fn test_override_redirect_wins() {
        let window = WindowId(1);
        let mut server = server_with(
            window,
            FakeWindow::new().override_redirect().with_type(WindowType::Dock),
        );
        assert_eq!(classifier().classify(&mut server, window), WindowClass::Ignored);
    }

    #[test]
    fn test_dock_window_type() {
        let window = WindowId(2);
        let mut server = server_with(window, FakeWindow::new().with_type(WindowType::Dock));
        assert_eq!(classifier().classify(&mut server, window), WindowClass::Dock);
    }

    #[test]
    fn test_bar_class_without_window_type() {
        let window = WindowId(3);
        let mut server = server_with(window, FakeWindow::new().with_class("bar", "Bar"));
        assert_eq!(classifier().classify(&mut server, window), WindowClass::Dock);
    }

    #[test]
    fn test_class_match_is_exact_and_case_sensitive() {
        let classifier = classifier();
        for instance in ["Lemonbar", "lemonbar-xft", "BAR", "polybar"] {
            let window = WindowId(4);
            let mut server = server_with(window, FakeWindow::new().with_class(instance, "Bar"));
            assert_eq!(classifier.classify(&mut server, window), WindowClass::Manageable, "{}", instance);
        }
    }

    #[test]
    fn test_other_window_type_is_manageable() {
        let window = WindowId(5);
        let mut server = server_with(
            window,
            FakeWindow::new().with_type(WindowType::Other(42)).with_class("st", "St"),
        );
        assert_eq!(classifier().classify(&mut server, window), WindowClass::Manageable);
    }

    #[test]
    fn test_failed_lookups_default_to_manageable() {
        let mut server = DryRunServer::new(ScreenSize { width: 800, height: 600 });
        assert_eq!(classifier().classify(&mut server, WindowId(99)), WindowClass::Manageable);
    }
}
