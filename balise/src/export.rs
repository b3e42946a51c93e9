//! Export HTTP des documents de description des devices.
//!
//! SSDP ne transporte que des en-têtes : le control point récupère la
//! description complète du device en HTTP à l'URL `LOCATION` des annonces.
//! L'annonceur consomme l'exporter comme une boîte noire via le trait
//! [`Exporter`] ; il n'a besoin que de l'URL, jamais du contenu.

use crate::config::DiscoveryConfig;
use crate::errors::DiscoveryError;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{error, info};

/// Fournisseur des URLs de description, consommé par l'annonceur.
pub trait Exporter: Send + Sync {
    /// URL `LOCATION` de la description d'un device.
    fn location_for(&self, uuid: &str) -> String;

    /// Arrête l'exporter. Appelé par le shutdown du service, doit être
    /// idempotent.
    fn stop(&self);
}

type Descriptions = Arc<RwLock<HashMap<String, String>>>;

/// Exporter HTTP : sert les descriptions publiées sur
/// `GET /device/{uuid}/description.xml`.
pub struct HttpExporter {
    base_url: String,
    port: u16,
    descriptions: Descriptions,
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
}

impl HttpExporter {
    /// Crée l'exporter sur le port configuré ; l'URL de base est construite
    /// à partir de l'adresse IP locale devinée.
    pub fn new(config: &DiscoveryConfig) -> Self {
        let base_url = format!("http://{}:{}", guess_local_ip(), config.export_port);
        Self::with_base_url(base_url, config.export_port)
    }

    /// Variante avec URL de base explicite (reverse proxy, tests).
    pub fn with_base_url(base_url: impl Into<String>, port: u16) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            port,
            descriptions: Arc::new(RwLock::new(HashMap::new())),
            shutdown: Mutex::new(None),
        }
    }

    /// Publie (ou remplace) le document de description d'un device.
    pub fn publish_description(&self, uuid: impl Into<String>, xml: impl Into<String>) {
        self.descriptions.write().insert(uuid.into(), xml.into());
    }

    /// Retire la description d'un device.
    pub fn remove_description(&self, uuid: &str) {
        self.descriptions.write().remove(uuid);
    }

    pub fn description_for(&self, uuid: &str) -> Option<String> {
        self.descriptions.read().get(uuid).cloned()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Démarre le serveur HTTP. Un échec de bind est fatal, comme pour le
    /// socket SSDP.
    pub async fn start(&self) -> Result<(), DiscoveryError> {
        let router = Router::new()
            .route("/device/{uuid}/description.xml", get(serve_description))
            .with_state(self.descriptions.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(DiscoveryError::Socket)?;

        let (tx, rx) = oneshot::channel::<()>();
        *self.shutdown.lock() = Some(tx);

        info!("✅ Description exporter listening on {}", addr);
        tokio::spawn(async move {
            let serve = axum::serve(listener, router).with_graceful_shutdown(async {
                let _ = rx.await;
            });
            if let Err(e) = serve.await {
                error!("❌ Description exporter failed: {}", e);
            }
        });

        Ok(())
    }
}

impl Exporter for HttpExporter {
    fn location_for(&self, uuid: &str) -> String {
        format!("{}/device/{}/description.xml", self.base_url, uuid)
    }

    fn stop(&self) {
        if let Some(tx) = self.shutdown.lock().take() {
            let _ = tx.send(());
            info!("Description exporter stopped");
        }
    }
}

async fn serve_description(
    Path(uuid): Path<String>,
    State(descriptions): State<Descriptions>,
) -> impl IntoResponse {
    match descriptions.read().get(&uuid) {
        Some(xml) => (
            [(header::CONTENT_TYPE, "text/xml; charset=utf-8")],
            xml.clone(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Devine l'adresse IP locale de la machine.
///
/// Demande au système quelle interface serait utilisée pour joindre une
/// adresse publique (aucun paquet n'est émis, UDP est sans connexion).
/// Retourne `127.0.0.1` en cas d'échec.
pub fn guess_local_ip() -> String {
    match UdpSocket::bind("0.0.0.0:0") {
        Ok(socket) => {
            if socket.connect("8.8.8.8:80").is_ok() {
                if let Ok(local_addr) = socket.local_addr() {
                    return local_addr.ip().to_string();
                }
            }
            "127.0.0.1".to_string()
        }
        Err(_) => "127.0.0.1".to_string(),
    }
}
