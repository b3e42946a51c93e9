use thiserror::Error;

/// Erreurs fatales du sous-système de découverte.
///
/// Les erreurs d'envoi individuelles (un datagramme perdu) ne passent pas par
/// ce type : elles sont loggées et avalées par l'[`crate::ssdp::Announcer`].
/// Seules les erreurs qui empêchent le sous-système de fonctionner (bind du
/// socket, join du groupe multicast, démarrage de l'exporter) remontent ici.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("SSDP socket error: {0}")]
    Socket(#[from] std::io::Error),

    #[error("invalid multicast address '{0}'")]
    InvalidAddress(String),

    #[error("SSDP service already started")]
    AlreadyStarted,

    #[error("exporter error: {0}")]
    Exporter(String),
}
