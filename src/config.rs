use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::events::{KeyGrab, Keysym, Modifiers};
use crate::mappings::KeyNameToKeysym;
use crate::services::registry::MAX_CLIENTS;
use crate::services::status::BarPalette;
use crate::wm_error;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub bar: BarConfig,
    pub keys: KeysConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BarConfig {
    /// Высота полосы сверху, которую не занимают управляемые окна
    pub height: u32,
    pub active_fg: String,
    pub active_bg: String,
    pub inactive_fg: String,
    /// Имена ресурсов (WM_CLASS), по которым окно считается баром
    pub dock_names: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KeysConfig {
    pub modifiers: Vec<String>,
    pub close: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            height: 24,
            active_fg: "#ffffff".to_string(),
            active_bg: "#555555".to_string(),
            inactive_fg: "#aaaaaa".to_string(),
            dock_names: vec!["lemonbar".to_string(), "bar".to_string()],
        }
    }
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            modifiers: vec!["super".to_string()],
            close: "q".to_string(),
        }
    }
}

impl Config {
    /// Файл конфигурации необязателен: если его нет, берутся значения по умолчанию
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("SLOTWM_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        // Валидация бара
        if self.bar.height == 0 {
            anyhow::bail!("bar.height должно быть больше 0");
        }

        for (name, color) in [
            ("bar.active_fg", &self.bar.active_fg),
            ("bar.active_bg", &self.bar.active_bg),
            ("bar.inactive_fg", &self.bar.inactive_fg),
        ] {
            if !is_valid_color(color) {
                anyhow::bail!("Неверный цвет {} для {}: ожидается #rgb, #rrggbb или #aarrggbb", color, name);
            }
        }

        if self.bar.dock_names.iter().any(|name| name.is_empty()) {
            anyhow::bail!("Пустое имя в bar.dock_names");
        }

        // Валидация клавиш
        if self.keys.modifiers.is_empty() {
            anyhow::bail!("keys.modifiers не может быть пустым: цифры перехватываются глобально");
        }

        for modifier in &self.keys.modifiers {
            if !KeyNameToKeysym::is_modifier(modifier) {
                anyhow::bail!("Неверный модификатор '{}' в keys.modifiers", modifier);
            }
        }

        let close = self.close_keysym()?;
        if KeyNameToKeysym::to_digit(close.value()).is_some() {
            anyhow::bail!("keys.close '{}' конфликтует с клавишами выбора окна 1..9", self.keys.close);
        }

        Ok(())
    }

    pub fn modifiers(&self) -> Modifiers {
        let normalized: Vec<String> = self
            .keys
            .modifiers
            .iter()
            .map(|modifier| modifier.to_lowercase())
            .collect();
        Modifiers::from_vec(&normalized)
    }

    pub fn close_keysym(&self) -> crate::error::Result<Keysym> {
        KeyNameToKeysym::translate(&self.keys.close)
            .map(Keysym::new)
            .map_err(|e| wm_error!(invalid_key, "keys.close: {}", e))
    }

    /// Все комбинации для глобального перехвата: модификатор + 1..N и модификатор + close
    pub fn key_grabs(&self) -> Result<Vec<KeyGrab>> {
        let modifiers = self.modifiers();
        let mut grabs: Vec<KeyGrab> = (1..=MAX_CLIENTS as u8)
            .map(|digit| KeyGrab {
                keysym: Keysym::new(KeyNameToKeysym::digit(digit)),
                modifiers,
            })
            .collect();

        grabs.push(KeyGrab {
            keysym: self.close_keysym()?,
            modifiers,
        });

        Ok(grabs)
    }

    pub fn palette(&self) -> BarPalette {
        BarPalette {
            active_fg: self.bar.active_fg.clone(),
            active_bg: self.bar.active_bg.clone(),
            inactive_fg: self.bar.inactive_fg.clone(),
        }
    }
}

fn is_valid_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(hex) => {
            matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bar.height, 24);
        assert_eq!(config.bar.dock_names, vec!["lemonbar", "bar"]);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = Config::load("/nonexistent/slotwm-test.toml").unwrap();
        assert_eq!(config.keys.close, "q");
        assert_eq!(config.bar.active_bg, "#555555");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.bar.height = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.bar.active_fg = "white".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.keys.modifiers = vec!["hyper".to_string()];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.keys.modifiers.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_close_key_must_not_be_a_digit() {
        let mut config = Config::default();
        config.keys.close = "3".to_string();
        assert!(config.validate().is_err());

        config.keys.close = "escape".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_close_key() {
        let mut config = Config::default();
        config.keys.close = "hyperspace".to_string();

        assert!(matches!(
            config.close_keysym(),
            Err(crate::error::WmError::InvalidKey(_))
        ));
        assert!(config.validate().is_err());
        assert!(config.key_grabs().is_err());
    }

    #[test]
    fn test_key_grabs() {
        let config = Config::default();
        let grabs = config.key_grabs().unwrap();

        assert_eq!(grabs.len(), MAX_CLIENTS + 1);
        assert_eq!(grabs[0].keysym, Keysym(0x31));
        assert_eq!(grabs[8].keysym, Keysym(0x39));
        assert_eq!(grabs[9].keysym, Keysym(0x71));
        assert!(grabs.iter().all(|g| g.modifiers == Modifiers::new().with_super(true)));
    }

    #[test]
    fn test_color_validation() {
        assert!(is_valid_color("#fff"));
        assert!(is_valid_color("#a1b2c3"));
        assert!(is_valid_color("#80a1b2c3"));
        assert!(!is_valid_color("#12"));
        assert!(!is_valid_color("#gggggg"));
        assert!(!is_valid_color("555555"));
    }
}
