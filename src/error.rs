use thiserror::Error;

#[derive(Error, Debug)]
pub enum WmError {
    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Не удалось подключиться к X-серверу: {0}")]
    Connect(#[from] x11rb::errors::ConnectError),

    #[error("Ошибка соединения с X-сервером: {0}")]
    Connection(#[from] x11rb::errors::ConnectionError),

    #[error("Ошибка ответа X-сервера: {0}")]
    Reply(#[from] x11rb::errors::ReplyError),

    #[error("Достигнут предел управляемых окон ({capacity})")]
    RegistryFull { capacity: usize },

    #[error("Другой оконный менеджер уже запущен: {0}")]
    AnotherWmRunning(String),

    #[error("Неизвестная клавиша: {0}")]
    InvalidKey(String),

    #[error("Окно не найдено: {0}")]
    WindowNotFound(String),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, WmError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! wm_error {
    (invalid_key, $($arg:tt)*) => {
        $crate::error::WmError::InvalidKey(format!($($arg)*))
    };
    (window_not_found, $($arg:tt)*) => {
        $crate::error::WmError::WindowNotFound(format!($($arg)*))
    };
    (internal, $($arg:tt)*) => {
        $crate::error::WmError::Internal(format!($($arg)*))
    };
}
