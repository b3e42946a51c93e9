//! Configuration du sous-système de découverte.
//!
//! Les valeurs par défaut reprennent les choix classiques des stacks UPnP :
//! max-age de 1800 s, TTL multicast de 4 sauts, double envoi de chaque
//! NOTIFY pour compenser les pertes UDP, export HTTP sur le port 8080.
//! Le double envoi et la cadence de renouvellement sont des défauts
//! configurables, pas des contraintes du protocole.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration du service SSDP et de l'exporter HTTP.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Valeur de l'en-tête SERVER des annonces (ex: "linux/1.0 UPnP/1.1 Balise/0.1")
    pub server_header: String,

    /// Bail par défaut des annonces, en secondes (CACHE-CONTROL: max-age)
    pub max_age: u32,

    /// Nombre d'envois de chaque NOTIFY (mitigation des pertes UDP)
    pub announce_repeat: u32,

    /// TTL des datagrammes multicast (nombre de sauts)
    pub multicast_ttl: u32,

    /// Port HTTP de l'exporter de descriptions
    pub export_port: u16,

    /// Cadence de renouvellement quand le registre est vide (secondes)
    pub fallback_renewal_secs: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            server_header: format!(
                "{}/1.0 UPnP/1.1 Balise/{}",
                std::env::consts::OS,
                env!("CARGO_PKG_VERSION")
            ),
            max_age: 1800,
            announce_repeat: 2,
            multicast_ttl: 4,
            export_port: 8080,
            fallback_renewal_secs: 900,
        }
    }
}

impl DiscoveryConfig {
    /// Charge la configuration depuis un fichier YAML.
    ///
    /// Les champs absents du fichier prennent leur valeur par défaut.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.max_age, 1800);
        assert_eq!(config.announce_repeat, 2);
        assert_eq!(config.multicast_ttl, 4);
        assert_eq!(config.export_port, 8080);
        assert!(config.server_header.contains("UPnP/1.1"));
    }

    #[test]
    fn from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_age: 600\nexport_port: 9090").unwrap();

        let config = DiscoveryConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_age, 600);
        assert_eq!(config.export_port, 9090);
        // Les champs absents gardent leur défaut
        assert_eq!(config.announce_repeat, 2);
    }

    #[test]
    fn from_file_missing() {
        assert!(DiscoveryConfig::from_file("/nonexistent/balise.yaml").is_err());
    }
}
