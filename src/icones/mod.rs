// src/icones/mod.rs
//
// Résolution d’icônes (favicons) des signets.
//
// Chaîne : icône utilisateur -> (URL illisible : service secondaire)
//          -> hôte local : glyphe, aucune requête
//          -> carte d’icônes alternative (chargée une fois, single-flight)
//          -> service principal (duckduckgo)

pub mod hote;
pub mod resolveur;
pub mod source;

pub use resolveur::ResolveurIcones;
pub use source::{ErreurIcone, SourceHttp, SourceIcones};

pub const SERVICE_PRINCIPAL: &str = "https://icons.duckduckgo.com/ip3/";
pub const SERVICE_SECOURS: &str = "https://www.google.com/s2/favicons";

pub fn url_service_principal(domaine: &str) -> String {
    format!("{SERVICE_PRINCIPAL}{domaine}.ico")
}

pub fn url_service_secours(cible: &str, taille: u32) -> String {
    format!(
        "{SERVICE_SECOURS}?domain={}&sz={taille}",
        urlencoding::encode(cible)
    )
}

/// Glyphes intégrés (SVG), affichés sans réseau.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Glyphe {
    /// cible locale / délai dépassé
    Globe,
    /// image distante en échec
    Degradee,
    /// moteur de recherche sans icône
    Recherche,
}

impl Glyphe {
    /// Clé de cache pour le chargeur d’images d’egui.
    pub fn uri(self) -> &'static str {
        match self {
            Glyphe::Globe => "bytes://glyphe-globe.svg",
            Glyphe::Degradee => "bytes://glyphe-degradee.svg",
            Glyphe::Recherche => "bytes://glyphe-recherche.svg",
        }
    }

    pub fn svg(self) -> &'static [u8] {
        match self {
            Glyphe::Globe => SVG_GLOBE.as_bytes(),
            Glyphe::Degradee => SVG_DEGRADEE.as_bytes(),
            Glyphe::Recherche => SVG_RECHERCHE.as_bytes(),
        }
    }
}

const SVG_GLOBE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100"><circle cx="50" cy="50" r="40" fill="none" stroke="rgba(255,255,255,0.3)" stroke-width="2"/><path d="M20 50 h60 M50 20 v60 M25 30 A40 40 0 0 1 75 30 M25 70 A40 40 0 0 0 75 70" stroke="rgba(255,255,255,0.3)" stroke-width="2" fill="none"/></svg>"#;

const SVG_DEGRADEE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100"><rect width="100" height="100" rx="20" fill="#555"/><text x="50" y="50" font-family="Arial" font-size="50" text-anchor="middle" dy=".3em" fill="#fff">?</text></svg>"##;

const SVG_RECHERCHE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><path fill="rgba(255,255,255,0.3)" d="M15.5 14h-.79l-.28-.27A6.471 6.471 0 0 0 16 9.5 6.5 6.5 0 1 0 9.5 16c1.61 0 3.09-.59 4.23-1.57l.27.28v.79l5 4.99L20.49 19l-4.99-5zm-6 0C7.01 14 5 11.99 5 9.5S7.01 5 9.5 5 14 7.01 14 9.5 11.99 14 9.5 14z"/></svg>"#;

/// Résultat d’une résolution : image distante ou glyphe intégré.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Icone {
    Distante(String),
    Glyphe(Glyphe),
}

/// Glyphe affiché quand une image distante ne se charge pas.
pub fn icone_degradee() -> Glyphe {
    Glyphe::Degradee
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_des_services() {
        assert_eq!(
            url_service_principal("rust-lang.org"),
            "https://icons.duckduckgo.com/ip3/rust-lang.org.ico"
        );
        assert_eq!(
            url_service_secours("a b", 32),
            "https://www.google.com/s2/favicons?domain=a%20b&sz=32"
        );
    }

    #[test]
    fn glyphes_distincts() {
        let g = [Glyphe::Globe, Glyphe::Degradee, Glyphe::Recherche];
        for (i, a) in g.iter().enumerate() {
            assert!(a.uri().ends_with(".svg"));
            assert!(std::str::from_utf8(a.svg()).unwrap().starts_with("<svg"));
            for b in &g[i + 1..] {
                assert_ne!(a.uri(), b.uri());
            }
        }
        assert_eq!(icone_degradee(), Glyphe::Degradee);
    }
}
