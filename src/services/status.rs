use crate::error::Result;
use crate::services::registry::ClientRegistry;
use std::fmt::Write as _;
use std::io::Write;
use tracing::error;

/// Цвета бейджей в разметке lemonbar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarPalette {
    pub active_fg: String,
    pub active_bg: String,
    pub inactive_fg: String,
}

impl Default for BarPalette {
    fn default() -> Self {
        Self {
            active_fg: "#ffffff".to_string(),
            active_bg: "#555555".to_string(),
            inactive_fg: "#aaaaaa".to_string(),
        }
    }
}

/// Строка состояния для внешнего бара: по строке на каждое изменение,
/// всегда целиком и со сбросом буфера
pub struct StatusProjector<W: Write> {
    out: W,
    palette: BarPalette,
}

impl<W: Write> StatusProjector<W> {
    pub fn new(out: W, palette: BarPalette) -> Self {
        Self { out, palette }
    }

    pub fn render(&self, registry: &ClientRegistry, focus: Option<usize>) -> String {
        let mut line = String::from("%{l}");

        for (slot, _) in registry.occupied() {
            let label = slot + 1;
            if Some(slot) == focus {
                let _ = write!(
                    line,
                    " %{{F{}}}%{{B{}}} [{}] %{{B-}}%{{F-}} ",
                    self.palette.active_fg, self.palette.active_bg, label
                );
            } else {
                let _ = write!(line, " %{{F{}}} {} %{{F-}} ", self.palette.inactive_fg, label);
            }
        }

        if registry.is_empty() {
            line.push_str(" No windows ");
        }

        line.push('\n');
        line
    }

    pub fn emit(&mut self, registry: &ClientRegistry, focus: Option<usize>) {
        let line = self.render(registry, focus);
        if let Err(e) = self.write_line(&line) {
            error!("Не удалось записать строку состояния: {}", e);
        }
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        self.out.write_all(line.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    #[allow(dead_code)]
    pub fn output(&self) -> &W {
        &self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::WindowId;
    use std::io;

    /// Приёмник, который отвергает каждую запись
    struct ClosedPipe {
        attempts: usize,
    }

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            self.attempts += 1;
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "bar exited"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "bar exited"))
        }
    }

    fn projector() -> StatusProjector<Vec<u8>> {
        StatusProjector::new(Vec::new(), BarPalette::default())
    }

    #[test]
    fn test_empty_registry() {
        let registry = ClientRegistry::new();
        assert_eq!(projector().render(&registry, None), "%{l} No windows \n");
    }

    #[test]
    fn test_badges_in_slot_order() {
        let mut registry = ClientRegistry::new();
        registry.add(WindowId(1)).unwrap();
        registry.add(WindowId(2)).unwrap();
        registry.add(WindowId(3)).unwrap();

        assert_eq!(
            projector().render(&registry, Some(1)),
            "%{l} %{F#aaaaaa} 1 %{F-}  %{F#ffffff}%{B#555555} [2] %{B-}%{F-}  %{F#aaaaaa} 3 %{F-} \n"
        );
    }

    #[test]
    fn test_no_focus_renders_all_plain() {
        let mut registry = ClientRegistry::new();
        registry.add(WindowId(1)).unwrap();

        assert_eq!(projector().render(&registry, None), "%{l} %{F#aaaaaa} 1 %{F-} \n");
    }

    #[test]
    fn test_custom_palette() {
        let mut registry = ClientRegistry::new();
        registry.add(WindowId(1)).unwrap();
        let palette = BarPalette {
            active_fg: "#000".to_string(),
            active_bg: "#ff0000".to_string(),
            inactive_fg: "#888".to_string(),
        };
        let projector = StatusProjector::new(Vec::new(), palette);

        assert_eq!(
            projector.render(&registry, Some(0)),
            "%{l} %{F#000}%{B#ff0000} [1] %{B-}%{F-} \n"
        );
    }

    #[test]
    fn test_emit_appends_full_lines() {
        let mut registry = ClientRegistry::new();
        let mut projector = projector();

        projector.emit(&registry, None);
        registry.add(WindowId(9)).unwrap();
        projector.emit(&registry, Some(0));

        let output = String::from_utf8(projector.output().clone()).unwrap();
        assert_eq!(
            output,
            "%{l} No windows \n%{l} %{F#ffffff}%{B#555555} [1] %{B-}%{F-} \n"
        );
    }

    #[test]
    fn test_emit_survives_write_failures() {
        let mut registry = ClientRegistry::new();
        let mut projector = StatusProjector::new(ClosedPipe { attempts: 0 }, BarPalette::default());

        projector.emit(&registry, None);
        registry.add(WindowId(1)).unwrap();
        projector.emit(&registry, Some(0));

        // Каждая строка пробует записаться заново, ошибка не всплывает
        assert_eq!(projector.output().attempts, 2);

        let err = projector.write_line("%{l}\n").unwrap_err();
        assert!(matches!(err, crate::error::WmError::Io(_)));
    }
}
