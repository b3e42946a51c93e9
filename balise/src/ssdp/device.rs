//! Représentation d'un device annoncé par SSDP.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Device (racine ou embarqué) enregistré dans le registre de découverte.
///
/// Un device racine s'annonce sous trois types de notification (NT) :
/// `upnp:rootdevice`, son uuid et son type de device ; un device embarqué
/// sous deux (uuid et type). Chaque service du mapping `services` ajoute un
/// NT supplémentaire.
#[derive(Debug, Clone)]
pub struct DeviceRecord {
    /// Identifiant unique du device (ex: "uuid:9f0865b2-...")
    pub uuid: String,

    /// Type du device (ex: "urn:schemas-upnp-org:device:MediaRenderer:1")
    pub device_type: String,

    /// Device racine ou embarqué
    pub is_root: bool,

    /// Services exposés : type de service (URN) → identifiant de service.
    /// Jamais absent, vide si le device n'expose aucun service.
    pub services: BTreeMap<String, String>,

    /// Durée de validité des annonces, en secondes (CACHE-CONTROL: max-age)
    pub lease_duration: u32,

    /// Dernière annonce alive émise, renseignée par le registre
    pub last_announced: Option<DateTime<Utc>>,
}

/// Type de notification pour `upnp:rootdevice`.
pub(crate) const ROOT_DEVICE_NT: &str = "upnp:rootdevice";

impl DeviceRecord {
    /// Crée un device sans service.
    pub fn new(
        uuid: impl Into<String>,
        device_type: impl Into<String>,
        is_root: bool,
        lease_duration: u32,
    ) -> Self {
        Self {
            uuid: uuid.into(),
            device_type: device_type.into(),
            is_root,
            services: BTreeMap::new(),
            lease_duration,
            last_announced: None,
        }
    }

    /// Ajoute un service au device (style builder).
    pub fn with_service(
        mut self,
        service_type: impl Into<String>,
        service_id: impl Into<String>,
    ) -> Self {
        self.services.insert(service_type.into(), service_id.into());
        self
    }

    /// Liste ordonnée des types de notification annoncés par ce device.
    ///
    /// Racine : `upnp:rootdevice`, uuid, type de device, puis un NT par
    /// service. Embarqué : uuid, type de device, services.
    pub fn notification_types(&self) -> Vec<String> {
        let mut nts = Vec::with_capacity(3 + self.services.len());
        if self.is_root {
            nts.push(ROOT_DEVICE_NT.to_string());
        }
        nts.push(self.uuid.clone());
        nts.push(self.device_type.clone());
        nts.extend(self.services.keys().cloned());
        nts
    }

    /// USN associé à un type de notification : l'uuid seul pour le NT uuid,
    /// `<uuid>::<nt>` pour tous les autres.
    pub fn usn_for(&self, nt: &str) -> String {
        if nt == self.uuid {
            self.uuid.clone()
        } else {
            format!("{}::{}", self.uuid, nt)
        }
    }

    /// Types de notification de ce device qui répondent à une cible de
    /// recherche M-SEARCH (`ST`).
    ///
    /// `ssdp:all` répond pour tous les NTs ; `upnp:rootdevice` uniquement
    /// pour les devices racine ; sinon correspondance exacte sur l'uuid, le
    /// type de device ou un type de service.
    pub fn matches_search_target(&self, st: &str) -> Vec<String> {
        if st == "ssdp:all" {
            return self.notification_types();
        }
        let matched = match st {
            ROOT_DEVICE_NT => self.is_root,
            _ => st == self.uuid || st == self.device_type || self.services.contains_key(st),
        };
        if matched {
            vec![st.to_string()]
        } else {
            Vec::new()
        }
    }
}
