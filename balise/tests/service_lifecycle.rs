//! Cycle de vie du service : enregistrement, retrait, arrêt ordonné.

mod common;

use balise::ssdp::{DeviceRecord, Nts, SsdpService};
use balise::DiscoveryConfig;
use common::{FixedExporter, RecorderSink};
use std::sync::Arc;

fn service_with_recorder() -> (Arc<RecorderSink>, SsdpService) {
    let sink = Arc::new(RecorderSink::new());
    let service = SsdpService::with_sink(
        DiscoveryConfig::default(),
        Arc::new(FixedExporter),
        sink.clone(),
    );
    (sink, service)
}

#[test]
fn register_announces_immediately() {
    let (sink, service) = service_with_recorder();
    let device = DeviceRecord::new("uuid:X", "urn:schemas:device:1", true, 1800)
        .with_service("urn:schemas:service:1", "sid1");
    service.register_device(device);

    // 4 messages distincts, doublés : 8 datagrammes
    assert_eq!(sink.count(), 8);
    assert!(sink.messages().iter().all(|m| m.nts() == Some(Nts::Alive)));

    // L'annonce immédiate horodate le device
    assert!(
        service
            .registry()
            .get("uuid:X")
            .unwrap()
            .last_announced
            .is_some()
    );
}

#[test]
fn register_empty_uuid_is_silent() {
    let (sink, service) = service_with_recorder();
    service.register_device(DeviceRecord::new("", "urn:schemas:device:1", true, 1800));

    assert!(service.registry().is_empty());
    assert_eq!(sink.count(), 0);
}

#[test]
fn unregister_sends_byebye_then_removes() {
    let (sink, service) = service_with_recorder();
    service.register_device(DeviceRecord::new(
        "uuid:X",
        "urn:schemas:device:1",
        true,
        1800,
    ));
    sink.clear();

    service.unregister_device("uuid:X");
    assert!(service.registry().get("uuid:X").is_none());
    let messages = sink.messages();
    assert!(!messages.is_empty());
    assert!(messages.iter().all(|m| m.nts() == Some(Nts::ByeBye)));

    // Deuxième retrait : no-op, aucun message
    sink.clear();
    service.unregister_device("uuid:X");
    assert_eq!(sink.count(), 0);
}

#[test]
fn shutdown_sweeps_all_devices() {
    let (sink, mut service) = service_with_recorder();
    service.register_device(DeviceRecord::new(
        "uuid:A",
        "urn:schemas:device:1",
        true,
        1800,
    ));
    service.register_device(DeviceRecord::new(
        "uuid:B",
        "urn:schemas:device:2",
        false,
        1800,
    ));
    sink.clear();

    service.shutdown();

    let byebye_usns: Vec<String> = sink
        .messages()
        .iter()
        .filter(|m| m.nts() == Some(Nts::ByeBye))
        .map(|m| m.header("USN").unwrap().to_string())
        .collect();
    assert!(byebye_usns.iter().any(|u| u.starts_with("uuid:A")));
    assert!(byebye_usns.iter().any(|u| u.starts_with("uuid:B")));

    // Le registre est vide après l'arrêt
    assert!(service.registry().is_empty());

    // Un deuxième shutdown est un no-op
    sink.clear();
    service.shutdown();
    assert_eq!(sink.count(), 0);
}

#[test]
fn drop_sends_byebye_for_remaining_devices() {
    let sink = Arc::new(RecorderSink::new());
    {
        let service = SsdpService::with_sink(
            DiscoveryConfig::default(),
            Arc::new(FixedExporter),
            sink.clone(),
        );
        service.register_device(DeviceRecord::new(
            "uuid:X",
            "urn:schemas:device:1",
            true,
            1800,
        ));
        sink.clear();
    }

    assert!(
        sink.messages()
            .iter()
            .any(|m| m.nts() == Some(Nts::ByeBye)),
        "dropping a live service must sweep byebye"
    );
}
