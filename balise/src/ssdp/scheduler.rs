//! Renouvellement périodique des annonces alive.

use super::{Announcer, DeviceRegistry};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info};

/// Démarre le thread de renouvellement.
///
/// À chaque tick, ré-annonce alive tous les devices du registre puis
/// recalcule sa cadence : la moitié du bail le plus court, pour que les
/// control points ne voient jamais un bail expirer. Un registre vide donne
/// un tick no-op à la cadence de repli. L'arrêt passe par la fermeture du
/// canal `stop`, qui réveille le thread au milieu de son attente.
pub(crate) fn spawn(
    registry: Arc<DeviceRegistry>,
    announcer: Arc<Announcer>,
    stop: Receiver<()>,
    fallback: Duration,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        info!("✅ SSDP renewal scheduler started");
        loop {
            let interval = renewal_interval(registry.min_lease(), fallback);
            match stop.recv_timeout(interval) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }

            let records = registry.all();
            if records.is_empty() {
                debug!("renewal tick with empty registry, nothing to announce");
                continue;
            }
            debug!("renewal tick: re-announcing {} device(s)", records.len());
            for record in &records {
                announcer.announce_alive(record);
                registry.mark_announced(&record.uuid);
            }
        }
        info!("SSDP renewal scheduler stopped");
    })
}

/// Cadence de renouvellement : moitié du bail le plus court, repli sur
/// `fallback` quand le registre est vide. Jamais moins d'une seconde.
pub(crate) fn renewal_interval(min_lease: Option<u32>, fallback: Duration) -> Duration {
    match min_lease {
        Some(lease) => Duration::from_secs(u64::from(lease / 2).max(1)),
        None => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_is_half_shortest_lease() {
        let fallback = Duration::from_secs(900);
        assert_eq!(
            renewal_interval(Some(1800), fallback),
            Duration::from_secs(900)
        );
        assert_eq!(
            renewal_interval(Some(60), fallback),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn interval_never_below_one_second() {
        assert_eq!(
            renewal_interval(Some(1), Duration::from_secs(900)),
            Duration::from_secs(1)
        );
        assert_eq!(
            renewal_interval(Some(0), Duration::from_secs(900)),
            Duration::from_secs(1)
        );
    }

    #[test]
    fn empty_registry_uses_fallback() {
        let fallback = Duration::from_secs(42);
        assert_eq!(renewal_interval(None, fallback), fallback);
    }
}
