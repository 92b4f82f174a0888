use crate::events::{KeyEvent, Keysym};
use crate::mappings::KeyNameToKeysym;
use crate::services::registry::MAX_CLIENTS;

/// Команда, в которую превращается нажатие перехваченной клавиши
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Показать слот (цифра k -> слот k-1)
    Focus(usize),
    /// Разорвать соединение клиента в фокусе
    Close,
}

/// Сопоставление клавиш командам. Состояния не хранит.
pub struct CommandDispatcher {
    close: Keysym,
}

impl CommandDispatcher {
    pub fn new(close: Keysym) -> Self {
        Self { close }
    }

    /// Сюда попадают только перехваченные комбинации, поэтому модификаторы
    /// повторно не проверяются
    pub fn resolve(&self, event: &KeyEvent) -> Option<Command> {
        if event.keysym == self.close {
            return Some(Command::Close);
        }

        KeyNameToKeysym::to_digit(event.keysym.value())
            .map(usize::from)
            .filter(|&digit| (1..=MAX_CLIENTS).contains(&digit))
            .map(|digit| Command::Focus(digit - 1))
    }
}
