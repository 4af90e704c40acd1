// src/icones/hote.rs
//
// Classification des cibles : adresse locale / privée => jamais envoyée
// à un service d’icônes tiers.

use url::{Host, Url};

/// Hôte local ou privé : localhost, 127.x, 10.x, 192.168.x, 172.16-31.x, *.local, ::1.
pub fn est_hote_local(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(d)) => {
            let d = d.to_ascii_lowercase();
            d == "localhost" || d.ends_with(".local")
        }
        Some(Host::Ipv4(ip)) => ip.is_loopback() || ip.is_private(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

/// Cible locale au sens large : schéma file: ou hôte local.
pub fn est_adresse_locale(url: &Url) -> bool {
    url.scheme() == "file" || est_hote_local(url)
}
