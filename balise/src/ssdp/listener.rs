//! Thread d'écoute des M-SEARCH multicast.

use super::{Announcer, CancelToken, DeviceRegistry, SsdpMessage};
use std::net::UdpSocket;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, info, trace, warn};

/// Démarre le thread de réception.
///
/// Le socket a un timeout de lecture court : entre deux lectures bloquantes
/// le thread consulte le jeton d'annulation et sort proprement. Chaque
/// datagramme est traité de façon synchrone et indépendante ; les rafales
/// s'accumulent dans le buffer du socket côté OS (SSDP est best-effort, les
/// pertes sont acceptables).
pub(crate) fn spawn(
    socket: Arc<UdpSocket>,
    registry: Arc<DeviceRegistry>,
    announcer: Arc<Announcer>,
    stop: CancelToken,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut buf = [0u8; 8192];
        info!("✅ SSDP listener started");
        while !stop.is_cancelled() {
            match socket.recv_from(&mut buf) {
                Ok((n, src)) => {
                    let data = String::from_utf8_lossy(&buf[..n]);
                    handle_datagram(&data, src, &registry, &announcer);
                }
                Err(e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    // Timeout de lecture : re-vérifier le jeton
                    continue;
                }
                Err(e) => {
                    if stop.is_cancelled() {
                        break;
                    }
                    warn!("❌ SSDP read error: {}", e);
                }
            }
        }
        info!("SSDP listener stopped");
    })
}

/// Traite un datagramme entrant ; les messages malformés ou sans ST sont
/// ignorés sans réponse.
fn handle_datagram(
    data: &str,
    src: std::net::SocketAddr,
    registry: &DeviceRegistry,
    announcer: &Announcer,
) {
    let Some(msg) = SsdpMessage::parse(data) else {
        trace!("unparseable SSDP datagram from {}", src);
        return;
    };
    if !msg.is_msearch() {
        // NOTIFY d'autres devices, réponses croisées : rien à faire côté device
        return;
    }
    let Some(st) = msg.search_target() else {
        trace!("M-SEARCH from {} without ST header, ignoring", src);
        return;
    };
    debug!("📥 M-SEARCH from {} (ST={})", src, st);
    for record in registry.all() {
        announcer.search_reply(&record, st, src);
    }
}
