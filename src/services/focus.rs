use crate::services::registry::ClientRegistry;
use crate::services::window_server::{absorb, WindowServer};
use tracing::debug;

/// Какой слот сейчас видим и держит фокус ввода.
///
/// Инвариант: если `current` равен `Some(i)`, слот `i` занят, а все
/// остальные занятые слоты скрыты.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusController {
    current: Option<usize>,
}

impl FocusController {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Показать слот, поднять его и отдать ему ввод.
    ///
    /// Возвращает false, если слот пуст или вне диапазона; в этом случае
    /// ничего не меняется. Повторный фокус текущего слота только заново
    /// поднимает окно, не трогая остальные.
    pub fn focus<S: WindowServer + ?Sized>(
        &mut self,
        registry: &ClientRegistry,
        server: &mut S,
        slot: usize,
    ) -> bool {
        let Some(window) = registry.handle(slot) else {
            debug!("Слот {} пуст, фокус не меняется", slot + 1);
            return false;
        };

        if let Some(previous) = self.current.filter(|&previous| previous != slot) {
            if let Some(previous_window) = registry.handle(previous) {
                absorb("unmap", previous_window, server.unmap(previous_window));
            }
        }

        self.current = Some(slot);
        absorb("map", window, server.map(window));
        absorb("raise", window, server.raise(window));
        absorb("set_input_focus", window, server.set_input_focus(window));

        debug!("Фокус на слоте {} (окно {})", slot + 1, window);
        true
    }

    /// Согласовать фокус после удаления слота `removed`.
    ///
    /// Реестр к этому моменту уже уплотнён: всё, что стояло после
    /// `removed`, сдвинуто на одну позицию к началу.
    pub fn on_removed<S: WindowServer + ?Sized>(
        &mut self,
        registry: &ClientRegistry,
        server: &mut S,
        removed: usize,
    ) {
        match self.current {
            None => {}
            Some(current) if removed < current => self.current = Some(current - 1),
            Some(current) if removed > current => {}
            Some(_) => {
                if registry.is_occupied(removed) {
                    // На место удалённого сдвинулся следующий клиент
                    self.focus(registry, server, removed);
                } else if removed > 0 && registry.is_occupied(removed - 1) {
                    self.focus(registry, server, removed - 1);
                } else {
                    debug!("Последнее окно закрыто, фокуса нет");
                    self.current = None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ScreenSize, WindowId};
    use crate::services::window_server::{DryRunServer, FakeWindow, ServerRequest};

    fn setup(count: u32) -> (ClientRegistry, DryRunServer) {
        let mut registry = ClientRegistry::new();
        let mut server = DryRunServer::new(ScreenSize { width: 800, height: 600 });
        for id in 1..=count {
            server.add_window(WindowId(id), FakeWindow::new());
            registry.add(WindowId(id)).unwrap();
        }
        (registry, server)
    }

    #[test]
    fn test_focus_shows_exactly_one_window() {
        let (registry, mut server) = setup(3);
        let mut focus = FocusController::new();

        assert!(focus.focus(&registry, &mut server, 0));
        assert!(focus.focus(&registry, &mut server, 2));

        assert_eq!(focus.current(), Some(2));
        assert_eq!(server.mapped_windows(), vec![WindowId(3)]);
        assert_eq!(server.top(), Some(WindowId(3)));
        assert_eq!(server.focused(), Some(WindowId(3)));
    }

    #[test]
    fn test_focus_on_empty_or_invalid_slot_is_noop() {
        let (registry, mut server) = setup(2);
        let mut focus = FocusController::new();
        focus.focus(&registry, &mut server, 1);
        server.clear_requests();

        assert!(!focus.focus(&registry, &mut server, 5));
        assert!(!focus.focus(&registry, &mut server, 42));

        assert_eq!(focus.current(), Some(1));
        assert!(server.requests().is_empty());
    }

    #[test]
    fn test_refocus_does_not_hide_anything() {
        let (registry, mut server) = setup(2);
        let mut focus = FocusController::new();
        focus.focus(&registry, &mut server, 1);
        server.clear_requests();

        assert!(focus.focus(&registry, &mut server, 1));

        assert!(!server
            .requests()
            .iter()
            .any(|r| matches!(r, ServerRequest::Unmap(_))));
        assert_eq!(
            server.requests(),
            &[
                ServerRequest::Map(WindowId(2)),
                ServerRequest::Raise(WindowId(2)),
                ServerRequest::SetInputFocus(WindowId(2)),
            ]
        );
    }

    #[test]
    fn test_removal_before_focus_shifts_index() {
        let (mut registry, mut server) = setup(4);
        let mut focus = FocusController::new();
        focus.focus(&registry, &mut server, 2);

        registry.remove(0);
        focus.on_removed(&registry, &mut server, 0);

        assert_eq!(focus.current(), Some(1));
        assert_eq!(registry.handle(1), Some(WindowId(3)));
    }

    #[test]
    fn test_removal_after_focus_keeps_index() {
        let (mut registry, mut server) = setup(4);
        let mut focus = FocusController::new();
        focus.focus(&registry, &mut server, 1);

        registry.remove(3);
        focus.on_removed(&registry, &mut server, 3);

        assert_eq!(focus.current(), Some(1));
    }

    #[test]
    fn test_removing_focused_prefers_successor() {
        let (mut registry, mut server) = setup(3);
        let mut focus = FocusController::new();
        focus.focus(&registry, &mut server, 1);

        registry.remove(1);
        focus.on_removed(&registry, &mut server, 1);

        assert_eq!(focus.current(), Some(1));
        assert_eq!(server.focused(), Some(WindowId(3)));
        assert!(server.is_mapped(WindowId(3)));
    }

    #[test]
    fn test_removing_focused_last_falls_back_to_predecessor() {
        let (mut registry, mut server) = setup(3);
        let mut focus = FocusController::new();
        focus.focus(&registry, &mut server, 2);

        registry.remove(2);
        focus.on_removed(&registry, &mut server, 2);

        assert_eq!(focus.current(), Some(1));
        assert_eq!(server.focused(), Some(WindowId(2)));
    }

    #[test]
    fn test_removing_only_client_clears_focus() {
        let (mut registry, mut server) = setup(1);
        let mut focus = FocusController::new();
        focus.focus(&registry, &mut server, 0);

        registry.remove(0);
        focus.on_removed(&registry, &mut server, 0);

        assert_eq!(focus.current(), None);
    }

    #[test]
    fn test_server_errors_are_absorbed() {
        let mut registry = ClientRegistry::new();
        let mut server = DryRunServer::new(ScreenSize { width: 800, height: 600 });
        server.add_window(WindowId(1), FakeWindow::new().broken());
        registry.add(WindowId(1)).unwrap();
        let mut focus = FocusController::new();

        assert!(focus.focus(&registry, &mut server, 0));
        assert_eq!(focus.current(), Some(0));
        assert_eq!(server.requests().len(), 3);
    }
}
