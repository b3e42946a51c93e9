//! Registre des devices annoncés.

use super::DeviceRecord;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::trace;

/// Registre `uuid → DeviceRecord`, seule ressource mutable partagée du
/// sous-système.
///
/// Toutes les opérations passent par un unique verrou : le registre est
/// touché par les appels d'enregistrement, par le thread d'écoute M-SEARCH,
/// par le scheduler de renouvellement et par le balayage byebye à l'arrêt.
/// Les lectures retournent des instantanés, jamais de référence vers
/// l'intérieur du verrou.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: Mutex<HashMap<String, DeviceRecord>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insère ou remplace un device. No-op silencieux si l'uuid est vide.
    pub fn register(&self, record: DeviceRecord) {
        if record.uuid.is_empty() {
            trace!("ignoring device record with empty uuid");
            return;
        }
        self.devices.lock().insert(record.uuid.clone(), record);
    }

    /// Retire un device. No-op si l'uuid est inconnu (idempotent).
    pub fn unregister(&self, uuid: &str) -> Option<DeviceRecord> {
        self.devices.lock().remove(uuid)
    }

    pub fn get(&self, uuid: &str) -> Option<DeviceRecord> {
        self.devices.lock().get(uuid).cloned()
    }

    /// Instantané des devices enregistrés.
    ///
    /// La séquence retournée est finie, ré-itérable, et insensible aux
    /// enregistrements concurrents postérieurs à l'appel.
    pub fn all(&self) -> Vec<DeviceRecord> {
        self.devices.lock().values().cloned().collect()
    }

    /// Horodate la dernière annonce alive d'un device.
    pub fn mark_announced(&self, uuid: &str) {
        if let Some(record) = self.devices.lock().get_mut(uuid) {
            record.last_announced = Some(Utc::now());
        }
    }

    /// Bail le plus court du registre, en secondes.
    pub fn min_lease(&self) -> Option<u32> {
        self.devices
            .lock()
            .values()
            .map(|r| r.lease_duration)
            .min()
    }

    pub fn len(&self) -> usize {
        self.devices.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.lock().is_empty()
    }

    /// Vide le registre (fin du balayage byebye à l'arrêt).
    pub fn clear(&self) {
        self.devices.lock().clear();
    }
}
