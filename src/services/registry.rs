use crate::error::{Result, WmError};
use crate::events::WindowId;

/// Число слотов: по одному на каждую цифру 1..9
pub const MAX_CLIENTS: usize = 9;

/// Слот реестра
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Client {
    pub handle: WindowId,
    pub occupied: bool,
}

/// Реестр управляемых окон фиксированной ёмкости.
///
/// Слоты `[0, count)` всегда заняты, `[count, MAX_CLIENTS)` всегда свободны:
/// `add` берёт первый свободный слот, `remove` сдвигает хвост к началу.
/// Номер слота меняется при удалениях, поэтому снаружи окно стоит
/// искать через `find_by_handle`.
#[derive(Debug, Clone, Default)]
pub struct ClientRegistry {
    slots: [Client; MAX_CLIENTS],
}

impl ClientRegistry {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Занять первый свободный слот
    pub fn add(&mut self, handle: WindowId) -> Result<usize> {
        let slot = self
            .slots
            .iter()
            .position(|client| !client.occupied)
            .ok_or(WmError::RegistryFull { capacity: MAX_CLIENTS })?;

        self.slots[slot] = Client {
            handle,
            occupied: true,
        };
        Ok(slot)
    }

    /// Освободить слот и уплотнить хвост. Возвращает false для пустого или
    /// несуществующего слота.
    pub fn remove(&mut self, slot: usize) -> bool {
        if !self.is_occupied(slot) {
            return false;
        }

        self.slots.copy_within(slot + 1.., slot);
        self.slots[MAX_CLIENTS - 1] = Client::default();
        true
    }

    pub fn find_by_handle(&self, handle: WindowId) -> Option<usize> {
        self.slots
            .iter()
            .position(|client| client.occupied && client.handle == handle)
    }

    pub fn handle(&self, slot: usize) -> Option<WindowId> {
        self.slots
            .get(slot)
            .filter(|client| client.occupied)
            .map(|client| client.handle)
    }

    pub fn is_occupied(&self, slot: usize) -> bool {
        self.slots.get(slot).is_some_and(|client| client.occupied)
    }

    pub fn count(&self) -> usize {
        self.slots.iter().filter(|client| client.occupied).count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    #[allow(dead_code)]
    pub fn is_full(&self) -> bool {
        self.count() == MAX_CLIENTS
    }

    /// Занятые слоты по порядку
    pub fn occupied(&self) -> impl Iterator<Item = (usize, WindowId)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, client)| client.occupied)
            .map(|(slot, client)| (slot, client.handle))
    }
}
