use crate::config::Config;
use crate::debug_if_enabled;
use crate::error::{Result, WmError};
use crate::events::{KeyEvent, KeyGrab, WindowGeometry, WindowId, WmEvent};
use crate::services::classifier::{WindowClass, WindowClassifier};
use crate::services::dispatcher::{Command, CommandDispatcher};
use crate::services::focus::FocusController;
use crate::services::registry::ClientRegistry;
use crate::services::status::StatusProjector;
use crate::services::window_server::{absorb, WindowServer};
use std::io::Write;
use tracing::{debug, info, warn};

/// Реестр и фокус: всё изменяемое состояние менеджера
#[derive(Debug, Clone, Default)]
pub struct WindowManagerState {
    pub registry: ClientRegistry,
    pub focus: FocusController,
}

/// Однопоточный реактивный оконный менеджер.
///
/// Каждое событие обрабатывается до конца, прежде чем будет запрошено
/// следующее, поэтому блокировки не нужны.
pub struct WindowManager<S: WindowServer, W: Write> {
    server: S,
    state: WindowManagerState,
    classifier: WindowClassifier,
    dispatcher: CommandDispatcher,
    projector: StatusProjector<W>,
    bar_height: u32,
    grabs: Vec<KeyGrab>,
}

impl<S: WindowServer, W: Write> WindowManager<S, W> {
    pub fn new(config: &Config, server: S, out: W) -> Result<Self> {
        let screen = server.screen_size();
        if config.bar.height >= u32::from(screen.height) {
            return Err(WmError::Config(anyhow::anyhow!(
                "bar.height ({}) не помещается на экран высотой {}",
                config.bar.height,
                screen.height
            )));
        }

        Ok(Self {
            server,
            state: WindowManagerState::default(),
            classifier: WindowClassifier::new(config.bar.dock_names.clone()),
            dispatcher: CommandDispatcher::new(config.close_keysym()?),
            projector: StatusProjector::new(out, config.palette()),
            bar_height: config.bar.height,
            grabs: config.key_grabs()?,
        })
    }

    /// Стать оконным менеджером и вывести первую строку состояния
    pub fn start(&mut self) -> Result<()> {
        self.server.setup(&self.grabs)?;
        self.emit_status();
        info!("Оконный менеджер запущен");
        Ok(())
    }

    /// Главный цикл: одно блокирующее ожидание на итерацию
    pub fn run(&mut self) -> Result<()> {
        while let Some(event) = self.server.next_event()? {
            self.handle_event(event);
            if let Err(e) = self.server.flush() {
                debug!("Не удалось сбросить буфер запросов: {}", e);
            }
        }

        info!("Источник событий закрыт");
        Ok(())
    }

    pub fn handle_event(&mut self, event: WmEvent) {
        debug_if_enabled!("Событие: {}", event);

        match event {
            WmEvent::MapRequest(window) => self.handle_map_request(window),
            WmEvent::DestroyNotify(window) => self.handle_destroy_notify(window),
            WmEvent::KeyPress(key) => self.handle_key_press(&key),
            WmEvent::Ignored => {}
        }
    }

    fn handle_map_request(&mut self, window: WindowId) {
        match self.classifier.classify(&mut self.server, window) {
            WindowClass::Ignored => debug!("Окно {} с override-redirect пропущено", window),
            WindowClass::Dock => {
                info!("Окно {} распознано как бар, показываем без управления", window);
                absorb("map", window, self.server.map(window));
            }
            WindowClass::Manageable => self.manage(window),
        }
    }

    fn handle_destroy_notify(&mut self, window: WindowId) {
        match self.state.registry.find_by_handle(window) {
            Some(slot) => self.remove_slot(slot),
            None => debug!("DestroyNotify для неуправляемого окна {}", window),
        }
    }

    fn handle_key_press(&mut self, key: &KeyEvent) {
        match self.dispatcher.resolve(key) {
            Some(Command::Focus(slot)) => self.focus_slot(slot),
            Some(Command::Close) => self.close_focused(),
            None => debug!("Клавиша {} не назначена", key.combination_id()),
        }
    }

    /// Взять окно под управление: слот, геометрия под баром, фокус
    pub fn manage(&mut self, window: WindowId) {
        if let Some(slot) = self.state.registry.find_by_handle(window) {
            // Повторный MapRequest от уже управляемого окна: второй слот ему не нужен
            debug!("Окно {} уже в слоте {}", window, slot + 1);
            self.focus_slot(slot);
            return;
        }

        let slot = match self.state.registry.add(window) {
            Ok(slot) => slot,
            Err(e) => {
                warn!("Окно {} не взято под управление: {}", window, e);
                return;
            }
        };

        let geometry = WindowGeometry::below_bar(self.server.screen_size(), self.bar_height);
        absorb("configure", window, self.server.configure(window, geometry));

        info!("Окно {} занимает слот {} ({})", window, slot + 1, geometry);
        self.focus_slot(slot);
    }

    pub fn focus_slot(&mut self, slot: usize) {
        let WindowManagerState { registry, focus } = &mut self.state;
        if focus.focus(registry, &mut self.server, slot) {
            self.emit_status();
        }
    }

    /// Удалить слот, уплотнить реестр и перенацелить фокус
    pub fn remove_slot(&mut self, slot: usize) {
        let WindowManagerState { registry, focus } = &mut self.state;
        let Some(window) = registry.handle(slot) else {
            return;
        };

        registry.remove(slot);
        focus.on_removed(registry, &mut self.server, slot);

        info!("Окно {} освободило слот {}", window, slot + 1);
        self.emit_status();
    }

    /// Разорвать соединение клиента в фокусе. Слот освободится только по DestroyNotify.
    fn close_focused(&mut self) {
        let focused = self
            .state
            .focus
            .current()
            .and_then(|slot| self.state.registry.handle(slot));

        match focused {
            Some(window) => {
                info!("Закрываем окно {}", window);
                absorb("kill_client", window, self.server.kill_client(window));
            }
            None => debug!("Нет окна в фокусе, закрывать нечего"),
        }
    }

    fn emit_status(&mut self) {
        self.projector
            .emit(&self.state.registry, self.state.focus.current());
    }

    #[allow(dead_code)]
    pub fn state(&self) -> &WindowManagerState {
        &self.state
    }

    #[allow(dead_code)]
    pub fn server(&self) -> &S {
        &self.server
    }

    #[allow(dead_code)]
    pub fn server_mut(&mut self) -> &mut S {
        &mut self.server
    }

    #[allow(dead_code)]
    pub fn output(&self) -> &W {
        self.projector.output()
    }
}
