//! Utilitaires partagés des tests d'intégration.
#![allow(dead_code)]

use balise::{DatagramSink, Exporter, SsdpMessage};
use parking_lot::Mutex;
use std::net::SocketAddr;

/// Puits de datagrammes qui enregistre tout ce qu'on lui envoie.
#[derive(Default)]
pub struct RecorderSink {
    sent: Mutex<Vec<(String, SocketAddr)>>,
}

impl RecorderSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tous les datagrammes émis, dans l'ordre d'envoi.
    pub fn datagrams(&self) -> Vec<String> {
        self.sent.lock().iter().map(|(p, _)| p.clone()).collect()
    }

    /// Datagrammes analysés en messages SSDP.
    pub fn messages(&self) -> Vec<SsdpMessage> {
        self.datagrams()
            .iter()
            .filter_map(|d| SsdpMessage::parse(d))
            .collect()
    }

    /// Datagrammes distincts (le double envoi produit des doublons exacts).
    pub fn distinct_datagrams(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for datagram in self.datagrams() {
            if !seen.contains(&datagram) {
                seen.push(datagram);
            }
        }
        seen
    }

    pub fn count(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn clear(&self) {
        self.sent.lock().clear();
    }
}

impl DatagramSink for RecorderSink {
    fn send(&self, payload: &[u8], dest: SocketAddr) -> std::io::Result<()> {
        self.sent
            .lock()
            .push((String::from_utf8_lossy(payload).to_string(), dest));
        Ok(())
    }
}

/// Puits qui échoue à chaque envoi mais compte les tentatives.
#[derive(Default)]
pub struct FailingSink {
    pub attempts: Mutex<usize>,
}

impl DatagramSink for FailingSink {
    fn send(&self, _payload: &[u8], _dest: SocketAddr) -> std::io::Result<()> {
        *self.attempts.lock() += 1;
        Err(std::io::Error::new(
            std::io::ErrorKind::NetworkUnreachable,
            "simulated send failure",
        ))
    }
}

/// Exporter de test avec une URL de base fixe.
pub struct FixedExporter;

impl Exporter for FixedExporter {
    fn location_for(&self, uuid: &str) -> String {
        format!("http://test.local:8080/device/{}/description.xml", uuid)
    }

    fn stop(&self) {}
}
