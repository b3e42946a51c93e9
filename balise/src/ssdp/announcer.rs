//! Émission des datagrammes SSDP : NOTIFY multicast et réponses M-SEARCH.

use super::{DeviceRecord, SsdpMessage, multicast_target};
use crate::config::DiscoveryConfig;
use crate::export::Exporter;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use tracing::{info, warn};

/// Puits de datagrammes, point d'injection pour les tests.
///
/// L'implémentation de production est le socket UDP du service ; les tests
/// enregistrent les envois pour compter et inspecter les messages.
pub trait DatagramSink: Send + Sync {
    fn send(&self, payload: &[u8], dest: SocketAddr) -> std::io::Result<()>;
}

impl DatagramSink for UdpSocket {
    fn send(&self, payload: &[u8], dest: SocketAddr) -> std::io::Result<()> {
        self.send_to(payload, dest).map(|_| ())
    }
}

/// Construit et émet les annonces SSDP pour les devices du registre.
///
/// Chaque NOTIFY est envoyé `announce_repeat` fois (2 par défaut) pour
/// compenser les pertes UDP. Une erreur d'envoi individuelle est loggée et
/// avalée : elle n'interrompt jamais le fan-out des messages restants.
pub struct Announcer {
    sink: Arc<dyn DatagramSink>,
    exporter: Arc<dyn Exporter>,
    config: DiscoveryConfig,
}

impl Announcer {
    pub fn new(
        sink: Arc<dyn DatagramSink>,
        exporter: Arc<dyn Exporter>,
        config: DiscoveryConfig,
    ) -> Self {
        Self {
            sink,
            exporter,
            config,
        }
    }

    /// Émet les NOTIFY ssdp:alive d'un device : un message par type de
    /// notification (racine : rootdevice + uuid + type ; embarqué : uuid +
    /// type ; plus un par service).
    pub fn announce_alive(&self, record: &DeviceRecord) {
        let location = self.exporter.location_for(&record.uuid);
        for nt in record.notification_types() {
            let usn = record.usn_for(&nt);
            let msg = SsdpMessage::notify_alive(
                &nt,
                &usn,
                &location,
                &self.config.server_header,
                record.lease_duration,
            );
            self.transmit(&msg, multicast_target());
            info!("✅ NOTIFY alive: {} (NT={})", usn, nt);
        }
    }

    /// Émet les NOTIFY ssdp:byebye d'un device, même fan-out que alive.
    pub fn announce_byebye(&self, record: &DeviceRecord) {
        for nt in record.notification_types() {
            let usn = record.usn_for(&nt);
            let msg = SsdpMessage::notify_byebye(&nt, &usn);
            self.transmit(&msg, multicast_target());
            info!("👋 NOTIFY byebye: {} (NT={})", usn, nt);
        }
    }

    /// Répond en unicast à un M-SEARCH pour les NTs du device qui
    /// correspondent à la cible `st`.
    pub fn search_reply(&self, record: &DeviceRecord, st: &str, dest: SocketAddr) {
        let location = self.exporter.location_for(&record.uuid);
        for nt in record.matches_search_target(st) {
            let usn = record.usn_for(&nt);
            let msg = SsdpMessage::search_response(
                &nt,
                &usn,
                &location,
                &self.config.server_header,
                record.lease_duration,
            );
            // Les réponses unicast sont envoyées une seule fois, le control
            // point ré-émet son M-SEARCH s'il n'a rien reçu.
            if let Err(e) = self.sink.send(&msg.to_bytes(), dest) {
                warn!("❌ Failed to send M-SEARCH response to {}: {}", dest, e);
            } else {
                info!("📡 M-SEARCH response sent to {} (ST={})", dest, nt);
            }
        }
    }

    fn transmit(&self, msg: &SsdpMessage, dest: SocketAddr) {
        let payload = msg.to_bytes();
        for _ in 0..self.config.announce_repeat.max(1) {
            if let Err(e) = self.sink.send(&payload, dest) {
                warn!(
                    "❌ Failed to send {} to {}: {}",
                    msg.start_line(),
                    dest,
                    e
                );
            }
        }
    }
}
