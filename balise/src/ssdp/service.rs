//! Poignée de haut niveau du sous-système de découverte.

use super::{
    Announcer, CancelToken, DatagramSink, DeviceRecord, DeviceRegistry, SSDP_MULTICAST_ADDR,
    SSDP_PORT, listener, scheduler,
};
use crate::config::DiscoveryConfig;
use crate::errors::DiscoveryError;
use crate::export::Exporter;
use crossbeam_channel::Sender;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{info, warn};

/// Service SSDP : possède le registre, l'annonceur et les deux threads
/// (écoute M-SEARCH, renouvellement). Pas de singleton global : le registre
/// appartient à cette poignée et circule par `Arc` vers les threads.
pub struct SsdpService {
    config: DiscoveryConfig,
    exporter: Arc<dyn Exporter>,
    registry: Arc<DeviceRegistry>,
    announcer: Option<Arc<Announcer>>,
    listener_stop: CancelToken,
    listener_handle: Option<JoinHandle<()>>,
    scheduler_stop: Option<Sender<()>>,
    scheduler_handle: Option<JoinHandle<()>>,
}

impl SsdpService {
    /// Crée le service. Aucun socket n'est ouvert avant [`start`](Self::start) ;
    /// un device enregistré avant le démarrage n'est annoncé qu'au premier
    /// tick de renouvellement.
    pub fn new(config: DiscoveryConfig, exporter: Arc<dyn Exporter>) -> Self {
        Self {
            config,
            exporter,
            registry: Arc::new(DeviceRegistry::new()),
            announcer: None,
            listener_stop: CancelToken::default(),
            listener_handle: None,
            scheduler_stop: None,
            scheduler_handle: None,
        }
    }

    /// Variante avec puits de datagrammes injecté, sans socket réel.
    /// Utilisée par les tests pour compter et inspecter les envois.
    pub fn with_sink(
        config: DiscoveryConfig,
        exporter: Arc<dyn Exporter>,
        sink: Arc<dyn DatagramSink>,
    ) -> Self {
        let mut service = Self::new(config, exporter.clone());
        service.announcer = Some(Arc::new(Announcer::new(
            sink,
            exporter,
            service.config.clone(),
        )));
        service
    }

    /// Démarre le sous-système : bind du socket SSDP, join du groupe
    /// multicast, threads d'écoute et de renouvellement.
    ///
    /// Un échec de bind ou de join est fatal et remonte à l'appelant : le
    /// processus hôte décide s'il continue sans découverte.
    pub fn start(&mut self) -> Result<(), DiscoveryError> {
        if self.listener_handle.is_some() {
            return Err(DiscoveryError::AlreadyStarted);
        }

        let group: Ipv4Addr = SSDP_MULTICAST_ADDR
            .parse()
            .map_err(|_| DiscoveryError::InvalidAddress(SSDP_MULTICAST_ADDR.to_string()))?;

        // SO_REUSEADDR pour cohabiter avec d'autres stacks UPnP sur la machine
        let raw = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        raw.set_reuse_address(true)?;
        let bind_addr: SocketAddr = SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), SSDP_PORT);
        raw.bind(&bind_addr.into())?;
        let socket: UdpSocket = raw.into();

        // Le join sur INADDR_ANY est obligatoire ; les joins par interface
        // sont best-effort (machines multi-homed).
        socket.join_multicast_v4(&group, &Ipv4Addr::UNSPECIFIED)?;
        for iface in get_if_addrs::get_if_addrs()? {
            if let std::net::IpAddr::V4(ipv4) = iface.ip() {
                if !ipv4.is_loopback() {
                    if let Err(e) = socket.join_multicast_v4(&group, &ipv4) {
                        warn!("SSDP: failed to join {} on {}: {}", group, ipv4, e);
                    }
                }
            }
        }

        // Timeout court : le thread d'écoute vérifie son jeton entre deux
        // lectures, ce qui borne aussi la latence du join à l'arrêt.
        socket.set_read_timeout(Some(Duration::from_secs(1)))?;
        socket.set_multicast_loop_v4(false)?;
        socket.set_multicast_ttl_v4(self.config.multicast_ttl)?;

        let socket = Arc::new(socket);
        let announcer = match &self.announcer {
            Some(a) => a.clone(),
            None => {
                let sink: Arc<dyn DatagramSink> = socket.clone();
                let a = Arc::new(Announcer::new(
                    sink,
                    self.exporter.clone(),
                    self.config.clone(),
                ));
                self.announcer = Some(a.clone());
                a
            }
        };

        self.listener_stop = CancelToken::default();
        self.listener_handle = Some(listener::spawn(
            socket,
            self.registry.clone(),
            announcer.clone(),
            self.listener_stop.clone(),
        ));

        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
        self.scheduler_stop = Some(stop_tx);
        self.scheduler_handle = Some(scheduler::spawn(
            self.registry.clone(),
            announcer,
            stop_rx,
            Duration::from_secs(self.config.fallback_renewal_secs),
        ));

        info!(
            "✅ SSDP service started on {}:{}",
            SSDP_MULTICAST_ADDR, SSDP_PORT
        );
        Ok(())
    }

    /// Enregistre un device puis émet immédiatement ses alive.
    pub fn register_device(&self, record: DeviceRecord) {
        if record.uuid.is_empty() {
            return;
        }
        self.registry.register(record.clone());
        if let Some(announcer) = &self.announcer {
            announcer.announce_alive(&record);
            self.registry.mark_announced(&record.uuid);
        }
    }

    /// Émet les byebye d'un device puis le retire du registre.
    /// No-op silencieux si l'uuid est inconnu.
    pub fn unregister_device(&self, uuid: &str) {
        if let Some(record) = self.registry.get(uuid) {
            if let Some(announcer) = &self.announcer {
                announcer.announce_byebye(&record);
            }
            self.registry.unregister(uuid);
        }
    }

    /// Registre des devices, partagé avec les threads du service.
    pub fn registry(&self) -> &Arc<DeviceRegistry> {
        &self.registry
    }

    /// Arrêt ordonné du sous-système :
    ///
    /// 1. balayage byebye de tous les devices enregistrés
    /// 2. arrêt de l'exporter
    /// 3. signal + join du thread d'écoute
    /// 4. signal + join du scheduler
    ///
    /// puis vidage du registre. Les échecs d'envoi à l'arrêt sont loggés par
    /// l'annonceur et ne bloquent pas les étapes suivantes. Idempotent, et
    /// sans effet de join si le service n'a jamais démarré.
    pub fn shutdown(&mut self) {
        let records = self.registry.all();
        if !records.is_empty() {
            info!(
                "👋 Shutting down SSDP service, sending byebye for {} device(s)",
                records.len()
            );
            if let Some(announcer) = &self.announcer {
                for record in &records {
                    announcer.announce_byebye(record);
                }
            }
        }

        self.exporter.stop();

        self.listener_stop.cancel();
        if let Some(handle) = self.listener_handle.take() {
            if handle.join().is_err() {
                warn!("SSDP listener thread panicked during shutdown");
            }
        }

        // La fermeture du canal réveille le scheduler au milieu de son attente
        self.scheduler_stop.take();
        if let Some(handle) = self.scheduler_handle.take() {
            if handle.join().is_err() {
                warn!("SSDP scheduler thread panicked during shutdown");
            }
        }

        self.registry.clear();
        info!("SSDP service stopped");
    }
}

impl Drop for SsdpService {
    fn drop(&mut self) {
        // Filet de sécurité : un service encore actif émet ses byebye
        if self.listener_handle.is_some() || !self.registry.is_empty() {
            self.shutdown();
        }
    }
}
