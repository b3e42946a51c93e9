//! Messages SSDP : construction structurée et analyse.
//!
//! Un message est une ligne de départ suivie d'une séquence ordonnée de
//! paires (nom, valeur) d'en-têtes, sérialisée une seule fois en lignes
//! terminées par CRLF avec une ligne vide finale. La construction et
//! l'analyse passent par la même structure, ce qui évite les découpages de
//! chaînes ad hoc.

use super::{SSDP_MULTICAST_ADDR, SSDP_PORT};

/// Sous-type de notification (en-tête NTS).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nts {
    Alive,
    ByeBye,
}

impl Nts {
    pub fn as_str(&self) -> &'static str {
        match self {
            Nts::Alive => "ssdp:alive",
            Nts::ByeBye => "ssdp:byebye",
        }
    }
}

/// Message SSDP : ligne de départ + en-têtes ordonnés.
#[derive(Debug, Clone)]
pub struct SsdpMessage {
    start_line: String,
    headers: Vec<(String, String)>,
}

impl SsdpMessage {
    /// Construit un NOTIFY ssdp:alive.
    pub fn notify_alive(
        nt: &str,
        usn: &str,
        location: &str,
        server: &str,
        max_age: u32,
    ) -> Self {
        Self {
            start_line: "NOTIFY * HTTP/1.1".to_string(),
            headers: vec![
                ("HOST".into(), format!("{}:{}", SSDP_MULTICAST_ADDR, SSDP_PORT)),
                ("CACHE-CONTROL".into(), format!("max-age={}", max_age)),
                ("LOCATION".into(), location.to_string()),
                ("NT".into(), nt.to_string()),
                ("NTS".into(), Nts::Alive.as_str().to_string()),
                ("SERVER".into(), server.to_string()),
                ("USN".into(), usn.to_string()),
            ],
        }
    }

    /// Construit un NOTIFY ssdp:byebye (sans CACHE-CONTROL ni LOCATION).
    pub fn notify_byebye(nt: &str, usn: &str) -> Self {
        Self {
            start_line: "NOTIFY * HTTP/1.1".to_string(),
            headers: vec![
                ("HOST".into(), format!("{}:{}", SSDP_MULTICAST_ADDR, SSDP_PORT)),
                ("NT".into(), nt.to_string()),
                ("NTS".into(), Nts::ByeBye.as_str().to_string()),
                ("USN".into(), usn.to_string()),
            ],
        }
    }

    /// Construit une réponse unicast à un M-SEARCH.
    pub fn search_response(
        st: &str,
        usn: &str,
        location: &str,
        server: &str,
        max_age: u32,
    ) -> Self {
        let date = chrono::Utc::now()
            .format("%a, %d %b %Y %H:%M:%S GMT")
            .to_string();
        Self {
            start_line: "HTTP/1.1 200 OK".to_string(),
            headers: vec![
                ("CACHE-CONTROL".into(), format!("max-age={}", max_age)),
                ("DATE".into(), date),
                ("EXT".into(), String::new()),
                ("LOCATION".into(), location.to_string()),
                ("SERVER".into(), server.to_string()),
                ("ST".into(), st.to_string()),
                ("USN".into(), usn.to_string()),
            ],
        }
    }

    /// Analyse un datagramme SSDP reçu.
    ///
    /// Les noms d'en-têtes sont insensibles à la casse, la valeur est coupée
    /// au premier `:` (les URLs contiennent des `:`). Les lignes malformées
    /// sont ignorées silencieusement ; seul un message sans ligne de départ
    /// est rejeté.
    pub fn parse(data: &str) -> Option<Self> {
        let mut lines = data.lines();
        let start_line = lines.next()?.trim();
        if start_line.is_empty() {
            return None;
        }

        let mut headers = Vec::new();
        for line in lines {
            let line = line.trim();
            if line.is_empty() {
                break;
            }
            if let Some(colon) = line.find(':') {
                let (name, value) = line.split_at(colon);
                let name = name.trim();
                if !name.is_empty() {
                    headers.push((
                        name.to_ascii_uppercase(),
                        value[1..].trim().to_string(),
                    ));
                }
            }
        }

        Some(Self {
            start_line: start_line.to_string(),
            headers,
        })
    }

    /// Sérialise le message en datagramme (CRLF, ligne vide finale).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = String::with_capacity(256);
        out.push_str(&self.start_line);
        out.push_str("\r\n");
        for (name, value) in &self.headers {
            out.push_str(name);
            out.push(':');
            if !value.is_empty() {
                out.push(' ');
                out.push_str(value);
            }
            out.push_str("\r\n");
        }
        out.push_str("\r\n");
        out.into_bytes()
    }

    pub fn start_line(&self) -> &str {
        &self.start_line
    }

    /// Valeur d'un en-tête, recherche insensible à la casse.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Sous-type de notification, si le message en porte un.
    pub fn nts(&self) -> Option<Nts> {
        match self.header("NTS")?.to_ascii_lowercase().as_str() {
            "ssdp:alive" => Some(Nts::Alive),
            "ssdp:byebye" => Some(Nts::ByeBye),
            _ => None,
        }
    }

    /// Vrai si le message est une requête M-SEARCH.
    pub fn is_msearch(&self) -> bool {
        self.start_line
            .to_ascii_uppercase()
            .starts_with("M-SEARCH ")
    }

    /// Cible de recherche (`ST`) d'un M-SEARCH.
    pub fn search_target(&self) -> Option<&str> {
        self.header("ST")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alive_framing() {
        let msg = SsdpMessage::notify_alive(
            "upnp:rootdevice",
            "uuid:X::upnp:rootdevice",
            "http://192.168.1.10:8080/device/X/description.xml",
            "linux/1.0 UPnP/1.1 Balise/0.1",
            1800,
        );
        let text = String::from_utf8(msg.to_bytes()).unwrap();

        assert!(text.starts_with("NOTIFY * HTTP/1.1\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
        assert!(text.contains("HOST: 239.255.255.250:1900\r\n"));
        assert!(text.contains("CACHE-CONTROL: max-age=1800\r\n"));
        assert!(text.contains("NTS: ssdp:alive\r\n"));
    }

    #[test]
    fn byebye_omits_location() {
        let msg = SsdpMessage::notify_byebye("urn:schemas:device:1", "uuid:X::urn:schemas:device:1");
        let text = String::from_utf8(msg.to_bytes()).unwrap();
        assert!(!text.contains("LOCATION"));
        assert!(!text.contains("CACHE-CONTROL"));
        assert!(text.contains("NTS: ssdp:byebye\r\n"));
    }

    #[test]
    fn byebye_round_trip() {
        let msg = SsdpMessage::notify_byebye("urn:schemas:device:1", "uuid:X::urn:schemas:device:1");
        let parsed = SsdpMessage::parse(&String::from_utf8(msg.to_bytes()).unwrap()).unwrap();

        assert_eq!(parsed.nts(), Some(Nts::ByeBye));
        assert_eq!(parsed.header("NT"), Some("urn:schemas:device:1"));
        assert_eq!(parsed.header("USN"), Some("uuid:X::urn:schemas:device:1"));
    }

    #[test]
    fn search_response_headers() {
        let msg = SsdpMessage::search_response(
            "urn:schemas:device:1",
            "uuid:X::urn:schemas:device:1",
            "http://192.168.1.10:8080/d.xml",
            "test-server",
            900,
        );
        let text = String::from_utf8(msg.to_bytes()).unwrap();

        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        // EXT est présent mais vide
        assert!(text.contains("EXT:\r\n"));
        assert!(msg.header("DATE").unwrap().ends_with("GMT"));
    }

    #[test]
    fn parse_msearch_case_insensitive() {
        let raw = "M-SEARCH * HTTP/1.1\r\n\
                   HOST: 239.255.255.250:1900\r\n\
                   MAN: \"ssdp:discover\"\r\n\
                   MX: 2\r\n\
                   st: ssdp:all\r\n\
                   \r\n";
        let msg = SsdpMessage::parse(raw).unwrap();
        assert!(msg.is_msearch());
        assert_eq!(msg.search_target(), Some("ssdp:all"));
    }

    #[test]
    fn parse_ignores_garbage_lines() {
        let raw = "NOTIFY * HTTP/1.1\r\nnot a header line\r\nNT: x\r\n\r\n";
        let msg = SsdpMessage::parse(raw).unwrap();
        assert_eq!(msg.header("NT"), Some("x"));
    }

    #[test]
    fn parse_empty() {
        assert!(SsdpMessage::parse("").is_none());
    }
}
