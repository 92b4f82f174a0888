use crate::config::Config;
use crate::error::Result;
use crate::events::{
    ClassHint, KeyEvent, KeyGrab, Keysym, ScreenSize, WindowAttributes, WindowGeometry, WindowId,
    WindowType, WmEvent,
};
use crate::mappings::KeyNameToKeysym;
use crate::wm_error;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::info;

use super::r#trait::WindowServer;

/// Окно, известное эмулированному серверу
#[derive(Debug, Clone, Default)]
pub struct FakeWindow {
    pub override_redirect: bool,
    pub window_type: Option<WindowType>,
    pub class_hint: Option<ClassHint>,
    /// Запросы к такому окну завершаются ошибкой (как BadWindow у X)
    pub broken: bool,
}

impl FakeWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class(mut self, instance: &str, class: &str) -> Self {
        self.class_hint = Some(ClassHint::new(instance, class));
        self
    }

    #[allow(dead_code)]
    pub fn with_type(mut self, window_type: WindowType) -> Self {
        self.window_type = Some(window_type);
        self
    }

    pub fn override_redirect(mut self) -> Self {
        self.override_redirect = true;
        self
    }

    #[allow(dead_code)]
    pub fn broken(mut self) -> Self {
        self.broken = true;
        self
    }
}

/// Запрос, отправленный серверу, в порядке поступления
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerRequest {
    Configure(WindowId, WindowGeometry),
    Map(WindowId),
    Unmap(WindowId),
    Raise(WindowId),
    SetInputFocus(WindowId),
    KillClient(WindowId),
}

/// Эмуляция X-сервера для режима сухого запуска и тестов.
///
/// Отдаёт события из очереди, записывает каждый запрос и ведёт модель
/// видимости окон, чтобы можно было проверить, что на экране ровно одно окно.
pub struct DryRunServer {
    screen: ScreenSize,
    events: VecDeque<WmEvent>,
    windows: HashMap<WindowId, FakeWindow>,
    mapped: HashSet<WindowId>,
    stacking: Vec<WindowId>,
    focused: Option<WindowId>,
    requests: Vec<ServerRequest>,
    grabs: Vec<KeyGrab>,
}

impl DryRunServer {
    pub fn new(screen: ScreenSize) -> Self {
        Self {
            screen,
            events: VecDeque::new(),
            windows: HashMap::new(),
            mapped: HashSet::new(),
            stacking: Vec::new(),
            focused: None,
            requests: Vec::new(),
            grabs: Vec::new(),
        }
    }

    /// Сценарий для `--dry-run`: бар, три окна, переключения и закрытия
    pub fn scripted_demo(config: &Config) -> Self {
        let mut server = Self::new(ScreenSize { width: 1920, height: 1080 });
        let modifiers = config.modifiers();
        let close = config.close_keysym().unwrap_or(Keysym(0x71));
        let digit = |n: u8| WmEvent::KeyPress(KeyEvent::new(Keysym::new(KeyNameToKeysym::digit(n)), modifiers));

        let bar = WindowId(0x0040_0001);
        let popup = WindowId(0x0050_0001);
        let terminals = [WindowId(0x0060_0001), WindowId(0x0060_0002), WindowId(0x0060_0003)];

        server.add_window(bar, FakeWindow::new().with_class("lemonbar", "Bar"));
        server.add_window(popup, FakeWindow::new().override_redirect());
        for terminal in terminals {
            server.add_window(terminal, FakeWindow::new().with_class("st", "St"));
        }

        server.push_event(WmEvent::MapRequest(bar));
        for terminal in terminals {
            server.push_event(WmEvent::MapRequest(terminal));
        }
        server.push_event(WmEvent::MapRequest(popup));
        server.push_event(digit(1));
        server.push_event(digit(3));
        server.push_event(digit(7));
        server.push_event(WmEvent::KeyPress(KeyEvent::new(close, modifiers)));
        server.push_event(WmEvent::DestroyNotify(terminals[0]));

        server
    }

    pub fn add_window(&mut self, window: WindowId, fake: FakeWindow) {
        self.windows.insert(window, fake);
    }

    pub fn push_event(&mut self, event: WmEvent) {
        self.events.push_back(event);
    }

    #[allow(dead_code)]
    pub fn is_mapped(&self, window: WindowId) -> bool {
        self.mapped.contains(&window)
    }

    #[allow(dead_code)]
    pub fn mapped_windows(&self) -> Vec<WindowId> {
        let mut windows: Vec<WindowId> = self.mapped.iter().copied().collect();
        windows.sort_by_key(|w| w.value());
        windows
    }

    #[allow(dead_code)]
    /// Верхнее окно стека
    pub fn top(&self) -> Option<WindowId> {
        self.stacking.last().copied()
    }

    #[allow(dead_code)]
    pub fn focused(&self) -> Option<WindowId> {
        self.focused
    }

    #[allow(dead_code)]
    pub fn requests(&self) -> &[ServerRequest] {
        &self.requests
    }

    #[allow(dead_code)]
    pub fn clear_requests(&mut self) {
        self.requests.clear();
    }

    #[allow(dead_code)]
    pub fn grabs(&self) -> &[KeyGrab] {
        &self.grabs
    }

    #[allow(dead_code)]
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    fn request(&mut self, request: ServerRequest, window: WindowId) -> Result<()> {
        info!("[DRY RUN] {:?}", request);
        self.requests.push(request);

        if self.windows.get(&window).is_some_and(|fake| fake.broken) {
            return Err(wm_error!(window_not_found, "BadWindow {}", window));
        }
        Ok(())
    }

    fn lookup(&self, window: WindowId) -> Result<&FakeWindow> {
        self.windows
            .get(&window)
            .ok_or_else(|| wm_error!(window_not_found, "BadWindow {}", window))
    }
}

impl WindowServer for DryRunServer {
    fn setup(&mut self, grabs: &[KeyGrab]) -> Result<()> {
        info!("[DRY RUN] Эмуляция X-сервера, перехвачено {} комбинаций", grabs.len());
        self.grabs = grabs.to_vec();
        Ok(())
    }

    fn next_event(&mut self) -> Result<Option<WmEvent>> {
        Ok(self.events.pop_front())
    }

    fn screen_size(&self) -> ScreenSize {
        self.screen
    }

    fn attributes(&mut self, window: WindowId) -> Result<WindowAttributes> {
        let fake = self.lookup(window)?;
        Ok(WindowAttributes {
            override_redirect: fake.override_redirect,
        })
    }

    fn window_type(&mut self, window: WindowId) -> Result<Option<WindowType>> {
        Ok(self.lookup(window)?.window_type)
    }

    fn class_hint(&mut self, window: WindowId) -> Result<Option<ClassHint>> {
        Ok(self.lookup(window)?.class_hint.clone())
    }

    fn configure(&mut self, window: WindowId, geometry: WindowGeometry) -> Result<()> {
        self.request(ServerRequest::Configure(window, geometry), window)
    }

    fn map(&mut self, window: WindowId) -> Result<()> {
        self.request(ServerRequest::Map(window), window)?;
        self.mapped.insert(window);
        Ok(())
    }

    fn unmap(&mut self, window: WindowId) -> Result<()> {
        self.request(ServerRequest::Unmap(window), window)?;
        self.mapped.remove(&window);
        Ok(())
    }

    fn raise(&mut self, window: WindowId) -> Result<()> {
        self.request(ServerRequest::Raise(window), window)?;
        self.stacking.retain(|&w| w != window);
        self.stacking.push(window);
        Ok(())
    }

    fn set_input_focus(&mut self, window: WindowId) -> Result<()> {
        self.request(ServerRequest::SetInputFocus(window), window)?;
        self.focused = Some(window);
        Ok(())
    }

    /// Как и настоящий сервер, вслед за разрывом соединения присылает DestroyNotify
    fn kill_client(&mut self, window: WindowId) -> Result<()> {
        self.request(ServerRequest::KillClient(window), window)?;
        self.windows.remove(&window);
        self.mapped.remove(&window);
        self.stacking.retain(|&w| w != window);
        if self.focused == Some(window) {
            self.focused = None;
        }
        self.events.push_back(WmEvent::DestroyNotify(window));
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
