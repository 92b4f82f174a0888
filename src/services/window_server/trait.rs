use crate::config::Config;
use crate::error::Result;
use crate::events::{
    ClassHint, KeyGrab, ScreenSize, WindowAttributes, WindowGeometry, WindowId, WindowType, WmEvent,
};

/// Всё, что ядро оконного менеджера спрашивает у X-сервера и чего от него требует.
///
/// Запросы возвращают `Result`, но ошибки на этой границе не фатальны:
/// вызывающая сторона явно отбрасывает их через [`absorb`](super::absorb).
pub trait WindowServer {
    /// Стать оконным менеджером (SubstructureRedirect на корне) и перехватить хоткеи
    fn setup(&mut self, grabs: &[KeyGrab]) -> Result<()>;

    /// Заблокироваться до следующего события; `None`, если источник событий иссяк
    fn next_event(&mut self) -> Result<Option<WmEvent>>;

    fn screen_size(&self) -> ScreenSize;

    fn attributes(&mut self, window: WindowId) -> Result<WindowAttributes>;

    fn window_type(&mut self, window: WindowId) -> Result<Option<WindowType>>;

    fn class_hint(&mut self, window: WindowId) -> Result<Option<ClassHint>>;

    fn configure(&mut self, window: WindowId, geometry: WindowGeometry) -> Result<()>;

    fn map(&mut self, window: WindowId) -> Result<()>;

    fn unmap(&mut self, window: WindowId) -> Result<()>;

    fn raise(&mut self, window: WindowId) -> Result<()>;

    fn set_input_focus(&mut self, window: WindowId) -> Result<()>;

    /// Принудительно разорвать соединение клиента (XKillClient)
    fn kill_client(&mut self, window: WindowId) -> Result<()>;

    fn flush(&mut self) -> Result<()>;
}

impl<S: WindowServer + ?Sized> WindowServer for Box<S> {
    fn setup(&mut self, grabs: &[KeyGrab]) -> Result<()> {
        (**self).setup(grabs)
    }

    fn next_event(&mut self) -> Result<Option<WmEvent>> {
        (**self).next_event()
    }

    fn screen_size(&self) -> ScreenSize {
        (**self).screen_size()
    }

    fn attributes(&mut self, window: WindowId) -> Result<WindowAttributes> {
        (**self).attributes(window)
    }

    fn window_type(&mut self, window: WindowId) -> Result<Option<WindowType>> {
        (**self).window_type(window)
    }

    fn class_hint(&mut self, window: WindowId) -> Result<Option<ClassHint>> {
        (**self).class_hint(window)
    }

    fn configure(&mut self, window: WindowId, geometry: WindowGeometry) -> Result<()> {
        (**self).configure(window, geometry)
    }

    fn map(&mut self, window: WindowId) -> Result<()> {
        (**self).map(window)
    }

    fn unmap(&mut self, window: WindowId) -> Result<()> {
        (**self).unmap(window)
    }

    fn raise(&mut self, window: WindowId) -> Result<()> {
        (**self).raise(window)
    }

    fn set_input_focus(&mut self, window: WindowId) -> Result<()> {
        (**self).set_input_focus(window)
    }

    fn kill_client(&mut self, window: WindowId) -> Result<()> {
        (**self).kill_client(window)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// Factory function to create an appropriate window server based on the dry_run flag
pub fn create_window_server(config: &Config, dry_run: bool) -> Result<Box<dyn WindowServer>> {
    if dry_run {
        Ok(Box::new(super::dry_run::DryRunServer::scripted_demo(config)))
    } else {
        Ok(Box::new(super::x11::X11Server::connect()?))
    }
}
