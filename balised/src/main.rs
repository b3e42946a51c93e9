//! Démon d'annonce SSDP : publie un device UPnP sur le réseau local et
//! répond aux recherches des control points jusqu'à Ctrl-C.

use anyhow::Result;
use balise::ssdp::DeviceRecord;
use balise::{DiscoveryConfig, Exporter, HttpExporter, SsdpService};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // ========== PHASE 1 : configuration ==========
    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from {}", path);
            DiscoveryConfig::from_file(&path)?
        }
        None => DiscoveryConfig::default(),
    };

    // ========== PHASE 2 : exporter de descriptions ==========
    let exporter = Arc::new(HttpExporter::new(&config));
    let uuid = format!("uuid:{}", uuid::Uuid::new_v4());
    exporter.publish_description(&uuid, description_xml(&uuid));
    exporter.start().await?;

    // ========== PHASE 3 : service SSDP ==========
    let mut service = SsdpService::new(config.clone(), exporter.clone());
    service.start()?;

    let device = DeviceRecord::new(
        &uuid,
        "urn:schemas-upnp-org:device:Basic:1",
        true,
        config.max_age,
    )
    .with_service(
        "urn:schemas-upnp-org:service:ConnectionManager:1",
        "urn:upnp-org:serviceId:ConnectionManager",
    );
    service.register_device(device);

    info!(
        "✅ Device {} announced, description at {}",
        uuid,
        exporter.location_for(&uuid)
    );

    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received, shutting down");
    service.shutdown();

    Ok(())
}

/// Description minimale du device de démonstration.
fn description_xml(uuid: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <specVersion><major>1</major><minor>1</minor></specVersion>
  <device>
    <deviceType>urn:schemas-upnp-org:device:Basic:1</deviceType>
    <friendlyName>Balise Demo Device</friendlyName>
    <manufacturer>Balise</manufacturer>
    <modelName>Balise Demo</modelName>
    <UDN>{uuid}</UDN>
  </device>
</root>
"#
    )
}
