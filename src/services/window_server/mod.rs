//! WindowServer: граница между ядром и X-сервером.
//!
//! Здесь только транспорт: запросы к серверу и перевод его событий в `WmEvent`.
//! Решения о слотах, фокусе и строке состояния принимает исключительно
//! `WindowManager`.

mod dry_run;
mod r#trait;
mod x11;

#[cfg(test)]
pub use self::dry_run::{DryRunServer, FakeWindow, ServerRequest};
pub use self::r#trait::{create_window_server, WindowServer};

use crate::error::Result;
use crate::events::WindowId;
use tracing::debug;

/// Отбросить ошибку запроса к серверу.
///
/// Ошибки вроде BadWindow означают гонку, которую уже разрешило более
/// позднее событие (например, окно успело умереть), поэтому они не
/// поднимаются выше границы.
pub fn absorb(request: &str, window: WindowId, result: Result<()>) {
    if let Err(e) = result {
        debug!("Запрос {} для окна {} не выполнен, игнорируем: {}", request, window, e);
    }
}
