use crate::error::{Result, WmError};
use crate::events::keyboard::IGNORED_LOCK_MASKS;
use crate::events::{
    ClassHint, KeyEvent, KeyGrab, Keysym, Modifiers, ScreenSize, WindowAttributes,
    WindowGeometry, WindowId, WindowType, WmEvent,
};
use crate::wm_error;
use x11rb::connection::Connection;
use x11rb::errors::ReplyError;
use x11rb::protocol::xproto::{
    Atom, AtomEnum, ChangeWindowAttributesAux, ConfigureWindowAux, ConnectionExt, EventMask,
    GrabMode, InputFocus, Keycode, ModMask, StackMode, Window,
};
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;
use tracing::{debug, info, warn};

use super::r#trait::WindowServer;

/// Атомы EWMH, нужные классификатору
struct Atoms {
    net_wm_window_type: Atom,
    net_wm_window_type_dock: Atom,
}

impl Atoms {
    fn intern(conn: &RustConnection) -> Result<Self> {
        let net_wm_window_type = conn.intern_atom(false, b"_NET_WM_WINDOW_TYPE")?;
        let net_wm_window_type_dock = conn.intern_atom(false, b"_NET_WM_WINDOW_TYPE_DOCK")?;

        Ok(Self {
            net_wm_window_type: net_wm_window_type.reply()?.atom,
            net_wm_window_type_dock: net_wm_window_type_dock.reply()?.atom,
        })
    }
}

/// Снимок раскладки клавиатуры: keycode -> keysym (первая колонка)
struct KeyboardMapping {
    min_keycode: Keycode,
    keysyms_per_keycode: usize,
    keysyms: Vec<u32>,
}

impl KeyboardMapping {
    fn fetch(conn: &RustConnection) -> Result<Self> {
        let setup = conn.setup();
        let min_keycode = setup.min_keycode;
        let max_keycode = setup.max_keycode;

        let mapping = conn
            .get_keyboard_mapping(min_keycode, max_keycode - min_keycode + 1)?
            .reply()?;

        Ok(Self {
            min_keycode,
            keysyms_per_keycode: usize::from(mapping.keysyms_per_keycode.max(1)),
            keysyms: mapping.keysyms,
        })
    }

    /// Аналог XLookupKeysym(event, 0)
    fn keysym(&self, keycode: Keycode) -> Option<Keysym> {
        let offset = usize::from(keycode.checked_sub(self.min_keycode)?);
        self.keysyms
            .get(offset * self.keysyms_per_keycode)
            .copied()
            .filter(|&keysym| keysym != 0)
            .map(Keysym::new)
    }

    /// Первый keycode, у которого в любой колонке стоит нужный keysym
    fn keycode(&self, keysym: Keysym) -> Option<Keycode> {
        self.keysyms
            .chunks(self.keysyms_per_keycode)
            .position(|column| column.contains(&keysym.value()))
            .and_then(|index| u8::try_from(index).ok())
            .and_then(|index| self.min_keycode.checked_add(index))
    }
}

pub struct X11Server {
    conn: RustConnection,
    root: Window,
    screen: ScreenSize,
    atoms: Atoms,
    keyboard: KeyboardMapping,
}

impl X11Server {
    /// Подключиться к дисплею из $DISPLAY. Неудача здесь фатальна.
    pub fn connect() -> Result<Self> {
        info!("Подключение к X-серверу");

        let (conn, screen_num) = x11rb::connect(None)?;

        let screen = conn
            .setup()
            .roots
            .get(screen_num)
            .ok_or_else(|| wm_error!(internal, "Экран {} не найден", screen_num))?;
        let root = screen.root;
        let size = ScreenSize {
            width: screen.width_in_pixels,
            height: screen.height_in_pixels,
        };

        let atoms = Atoms::intern(&conn)?;
        let keyboard = KeyboardMapping::fetch(&conn)?;

        info!(
            "Подключено к экрану {} ({}x{}), корневое окно 0x{:x}",
            screen_num, size.width, size.height, root
        );

        Ok(Self {
            conn,
            root,
            screen: size,
            atoms,
            keyboard,
        })
    }

    fn become_wm(&self) -> Result<()> {
        let event_mask = EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY;

        let cookie = self.conn.change_window_attributes(
            self.root,
            &ChangeWindowAttributesAux::new().event_mask(event_mask),
        )?;

        cookie
            .check()
            .map_err(|e| WmError::AnotherWmRunning(e.to_string()))?;

        info!("SubstructureRedirect на корневом окне получен");
        Ok(())
    }

    fn grab_key(&self, grab: &KeyGrab) -> Result<()> {
        let Some(keycode) = self.keyboard.keycode(grab.keysym) else {
            warn!("Для {} нет keycode в текущей раскладке, пропускаем", grab);
            return Ok(());
        };

        let modifiers = grab.modifiers.to_mask();
        // С CapsLock/NumLock X присылает другой state, поэтому хватаем все варианты
        let mut cookies = Vec::with_capacity(IGNORED_LOCK_MASKS.len());
        for lock in IGNORED_LOCK_MASKS {
            let cookie = self.conn.grab_key(
                true,
                self.root,
                ModMask::from(modifiers | lock),
                keycode,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
            )?;
            cookies.push((lock, cookie));
        }

        let results = cookies
            .into_iter()
            .map(|(lock, cookie)| (lock, cookie.check()));
        if report_grab_failures(grab, results) == 0 {
            debug!("Перехвачено {} (keycode {})", grab, keycode);
        }
        Ok(())
    }

    fn translate_event(&self, event: Event) -> WmEvent {
        match event {
            Event::MapRequest(e) => WmEvent::MapRequest(WindowId(e.window)),
            Event::DestroyNotify(e) => WmEvent::DestroyNotify(WindowId(e.window)),
            Event::KeyPress(e) => match self.keyboard.keysym(e.detail) {
                Some(keysym) => {
                    let modifiers = Modifiers::from_mask(u16::from(e.state));
                    WmEvent::KeyPress(KeyEvent::new(keysym, modifiers))
                }
                None => {
                    debug!("Keycode {} не сопоставлен ни одному keysym", e.detail);
                    WmEvent::Ignored
                }
            },
            Event::Error(e) => {
                // BadWindow и прочие асинхронные ошибки не должны ронять менеджер
                debug!(
                    "Ошибка протокола X11 {:?} (opcode {}, ресурс 0x{:x}) проигнорирована",
                    e.error_kind, e.major_opcode, e.bad_value
                );
                WmEvent::Ignored
            }
            _ => WmEvent::Ignored,
        }
    }
}

/// Залогировать отказы сервера в перехвате. Возвращает их число.
///
/// BadAccess означает, что комбинацию уже держит другой клиент; остальные
/// варианты перехвата при этом остаются в силе.
fn report_grab_failures(
    grab: &KeyGrab,
    results: impl IntoIterator<Item = (u16, std::result::Result<(), ReplyError>)>,
) -> usize {
    let mut failed = 0;
    for (lock, result) in results {
        if let Err(e) = result {
            warn!("Не удалось перехватить {} (маска блокировок 0x{:x}): {}", grab, lock, e);
            failed += 1;
        }
    }
    failed
}

impl WindowServer for X11Server {
    fn setup(&mut self, grabs: &[KeyGrab]) -> Result<()> {
        self.become_wm()?;

        for grab in grabs {
            self.grab_key(grab)?;
        }

        self.conn.flush()?;
        info!("Перехвачено {} комбинаций клавиш", grabs.len());
        Ok(())
    }

    fn next_event(&mut self) -> Result<Option<WmEvent>> {
        let event = self.conn.wait_for_event()?;
        Ok(Some(self.translate_event(event)))
    }

    fn screen_size(&self) -> ScreenSize {
        self.screen
    }

    fn attributes(&mut self, window: WindowId) -> Result<WindowAttributes> {
        let reply = self.conn.get_window_attributes(window.value())?.reply()?;
        Ok(WindowAttributes {
            override_redirect: reply.override_redirect,
        })
    }

    fn window_type(&mut self, window: WindowId) -> Result<Option<WindowType>> {
        let reply = self
            .conn
            .get_property(
                false,
                window.value(),
                self.atoms.net_wm_window_type,
                AtomEnum::ATOM,
                0,
                1,
            )?
            .reply()?;

        let first = reply.value32().and_then(|mut atoms| atoms.next());
        Ok(first.map(|atom| {
            if atom == self.atoms.net_wm_window_type_dock {
                WindowType::Dock
            } else {
                WindowType::Other(atom)
            }
        }))
    }

    fn class_hint(&mut self, window: WindowId) -> Result<Option<ClassHint>> {
        let reply = self
            .conn
            .get_property(
                false,
                window.value(),
                AtomEnum::WM_CLASS,
                AtomEnum::STRING,
                0,
                256,
            )?
            .reply()?;

        Ok(ClassHint::parse(&reply.value))
    }

    fn configure(&mut self, window: WindowId, geometry: WindowGeometry) -> Result<()> {
        let aux = ConfigureWindowAux::new()
            .x(geometry.x)
            .y(geometry.y)
            .width(geometry.width)
            .height(geometry.height)
            .border_width(geometry.border_width);
        self.conn.configure_window(window.value(), &aux)?;
        Ok(())
    }

    fn map(&mut self, window: WindowId) -> Result<()> {
        self.conn.map_window(window.value())?;
        Ok(())
    }

    fn unmap(&mut self, window: WindowId) -> Result<()> {
        self.conn.unmap_window(window.value())?;
        Ok(())
    }

    fn raise(&mut self, window: WindowId) -> Result<()> {
        let aux = ConfigureWindowAux::new().stack_mode(StackMode::ABOVE);
        self.conn.configure_window(window.value(), &aux)?;
        Ok(())
    }

    fn set_input_focus(&mut self, window: WindowId) -> Result<()> {
        self.conn
            .set_input_focus(InputFocus::POINTER_ROOT, window.value(), x11rb::CURRENT_TIME)?;
        Ok(())
    }

    fn kill_client(&mut self, window: WindowId) -> Result<()> {
        self.conn.kill_client(window.value())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.conn.flush()?;
        Ok(())
    }
}

impl Drop for X11Server {
    fn drop(&mut self) {
        info!("X11Server завершает работу");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::keyboard::{LOCK_MASK, MOD2_MASK};
    use x11rb::errors::ConnectionError;

    #[test]
    fn test_grab_failures_are_counted_per_lock_variant() {
        let grab = KeyGrab {
            keysym: Keysym(0x31),
            modifiers: Modifiers::new().with_super(true),
        };

        let all_ok = IGNORED_LOCK_MASKS.iter().map(|&lock| (lock, Ok(())));
        assert_eq!(report_grab_failures(&grab, all_ok), 0);

        let partly_taken = vec![
            (0, Ok(())),
            (LOCK_MASK, Err(ReplyError::ConnectionError(ConnectionError::UnknownError))),
            (MOD2_MASK, Ok(())),
            (
                LOCK_MASK | MOD2_MASK,
                Err(ReplyError::ConnectionError(ConnectionError::UnknownError)),
            ),
        ];
        assert_eq!(report_grab_failures(&grab, partly_taken), 2);
    }
}
