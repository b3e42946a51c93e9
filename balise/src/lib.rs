//! # Balise - Annonce et découverte SSDP pour devices UPnP
//!
//! Cette crate implémente le côté *device* du protocole SSDP (Simple Service
//! Discovery Protocol) : annonces NOTIFY alive/byebye en multicast, réponses
//! unicast aux M-SEARCH des control points, et renouvellement périodique des
//! annonces avant expiration du bail (`CACHE-CONTROL: max-age`).
//!
//! ## Architecture
//!
//! - [`ssdp::SsdpService`] : poignée de haut niveau (démarrage, enregistrement
//!   des devices, arrêt propre avec byebye)
//! - [`ssdp::DeviceRegistry`] : registre `uuid → DeviceRecord`, seule
//!   ressource mutable partagée
//! - [`ssdp::Announcer`] : construction et émission des datagrammes NOTIFY
//! - [`export::Exporter`] : fournit l'URL `LOCATION` de la description d'un
//!   device (implémentation HTTP fournie par [`export::HttpExporter`])
//!
//! La description complète des devices est servie en HTTP par l'exporter ;
//! SSDP ne transporte que les en-têtes de découverte.

pub mod config;
pub mod errors;
pub mod export;
pub mod ssdp;

pub use config::DiscoveryConfig;
pub use errors::DiscoveryError;
pub use export::{Exporter, HttpExporter};
pub use ssdp::{Announcer, DatagramSink, DeviceRecord, DeviceRegistry, SsdpMessage, SsdpService};
