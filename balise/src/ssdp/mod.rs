//! # Module SSDP - Simple Service Discovery Protocol
//!
//! Implémentation du côté device du protocole SSDP pour UPnP : annonces
//! multicast et réponses aux recherches des control points.
//!
//! ## Fonctionnalités
//!
//! - ✅ Envoi de NOTIFY alive/byebye en multicast
//! - ✅ Réponse aux M-SEARCH en unicast
//! - ✅ Registre multi-devices avec services embarqués
//! - ✅ Renouvellement périodique avant expiration du bail
//! - ✅ Arrêt propre avec balayage byebye
//!
//! ## Constantes SSDP
//!
//! - **Adresse multicast** : 239.255.255.250:1900
//! - **Max-Age par défaut** : 1800 secondes
//! - **Renouvellement** : moitié du bail le plus court du registre

mod announcer;
mod device;
mod listener;
mod message;
mod registry;
mod scheduler;
mod service;

pub use announcer::{Announcer, DatagramSink};
pub use device::DeviceRecord;
pub use message::{Nts, SsdpMessage};
pub use registry::DeviceRegistry;
pub use service::SsdpService;

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Adresse multicast SSDP
pub const SSDP_MULTICAST_ADDR: &str = "239.255.255.250";

/// Port SSDP
pub const SSDP_PORT: u16 = 1900;

/// Adresse de destination des NOTIFY multicast.
pub(crate) fn multicast_target() -> SocketAddr {
    SocketAddr::new(
        SSDP_MULTICAST_ADDR.parse().expect("constant address"),
        SSDP_PORT,
    )
}

/// Jeton d'annulation partagé entre la poignée du service et ses threads.
///
/// Le thread d'écoute le consulte entre deux lectures bloquantes (le socket a
/// un timeout de lecture court) plutôt que de compter sur l'exception d'un
/// socket fermé sous lui.
#[derive(Debug, Clone, Default)]
pub(crate) struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub(crate) fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
