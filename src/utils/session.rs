use crate::error::{Result, WmError};
use tracing::{info, warn};

/// Проверить, что процесс запущен в X-сессии, которой можно управлять
pub fn check_session() -> Result<()> {
    info!("Проверка окружения X-сессии...");

    check_display()?;
    check_session_type();

    info!("Проверка окружения завершена успешно");
    Ok(())
}

fn check_display() -> Result<()> {
    match std::env::var("DISPLAY") {
        Ok(name) if !name.is_empty() => {
            info!("Используется дисплей {}", name);
            Ok(())
        }
        _ => Err(WmError::Internal(
            "Переменная DISPLAY не задана: запустите менеджер из xinit/startx".to_string(),
        )),
    }
}

fn check_session_type() {
    if let Ok(session) = std::env::var("XDG_SESSION_TYPE") {
        if session == "wayland" {
            warn!("Обнаружена Wayland-сессия: управлять можно только окнами XWayland");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_display_follows_environment() {
        let saved = std::env::var("DISPLAY").ok();

        std::env::set_var("DISPLAY", ":1");
        assert!(check_display().is_ok());

        std::env::set_var("DISPLAY", "");
        assert!(matches!(check_display(), Err(WmError::Internal(_))));

        std::env::remove_var("DISPLAY");
        assert!(check_display().is_err());

        match saved {
            Some(value) => std::env::set_var("DISPLAY", value),
            None => std::env::remove_var("DISPLAY"),
        }
    }
}
