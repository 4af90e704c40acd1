// src/moteurs.rs
//
// Moteurs de recherche : intégrés + personnalisés (clé -> {name, url, icon}),
// construction de l’URL de recherche, aiguillage navigation / recherche.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::icones::{url_service_secours, Glyphe, Icone};
use crate::validation::{est_url_navigateur, valide_nom, ErreurValidation};

pub const MARQUEUR_RECHERCHE: &str = "{searchTerm}";
pub const MOTEUR_DEFAUT: &str = "google";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoteurIntegre {
    pub cle: &'static str,
    pub nom: &'static str,
    pub prefixe: &'static str,
    pub icone: &'static str,
}

pub const MOTEURS_INTEGRES: [MoteurIntegre; 4] = [
    MoteurIntegre {
        cle: "google",
        nom: "Google",
        prefixe: "https://www.google.com/search?q=",
        icone: "https://www.google.com/favicon.ico",
    },
    MoteurIntegre {
        cle: "ddg",
        nom: "DuckDuckGo",
        prefixe: "https://duckduckgo.com/?q=",
        icone: "https://duckduckgo.com/favicon.ico",
    },
    MoteurIntegre {
        cle: "brave",
        nom: "Brave",
        prefixe: "https://search.brave.com/search?q=",
        icone: "https://brave.com/favicon.ico",
    },
    MoteurIntegre {
        cle: "yandex",
        nom: "Yandex",
        prefixe: "https://yandex.com/search/?text=",
        icone: "https://yandex.com/favicon.ico",
    },
];

fn integre(cle: &str) -> Option<&'static MoteurIntegre> {
    MOTEURS_INTEGRES.iter().find(|m| m.cle == cle)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoteurPerso {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl MoteurPerso {
    fn icone_saisie(&self) -> Option<&str> {
        self.icon.as_deref().map(str::trim).filter(|i| !i.is_empty())
    }
}

/// Nom en minuscules, sans caractère non alphanumérique ASCII.
pub fn cle_moteur(nom: &str) -> String {
    nom.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

pub fn valide_url_moteur(url: &str) -> Result<(), ErreurValidation> {
    Url::parse(url).map_err(|_| ErreurValidation::UrlInvalide)?;
    if !url.contains(MARQUEUR_RECHERCHE) {
        return Err(ErreurValidation::SansMarqueur);
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ErreurValidation::ProtocoleMoteur);
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Moteurs {
    perso: BTreeMap<String, MoteurPerso>,
    selection: String,
}

impl Default for Moteurs {
    fn default() -> Self {
        Self {
            perso: BTreeMap::new(),
            selection: MOTEUR_DEFAUT.to_string(),
        }
    }
}

impl Moteurs {
    /// `derniere` : clé mémorisée, ignorée si elle ne désigne plus aucun moteur.
    pub fn new(perso: BTreeMap<String, MoteurPerso>, derniere: Option<&str>) -> Self {
        let mut m = Self {
            perso,
            selection: MOTEUR_DEFAUT.to_string(),
        };
        if let Some(c) = derniere {
            m.selectionne(c);
        }
        m
    }

    pub fn perso(&self) -> &BTreeMap<String, MoteurPerso> {
        &self.perso
    }

    pub fn selection(&self) -> &str {
        &self.selection
    }

    pub fn existe(&self, cle: &str) -> bool {
        integre(cle).is_some() || self.perso.contains_key(cle)
    }

    pub fn selectionne(&mut self, cle: &str) -> bool {
        if !self.existe(cle) {
            return false;
        }
        self.selection = cle.to_string();
        true
    }

    /// (clé, nom affiché, personnalisé ?) : intégrés puis personnalisés.
    pub fn liste(&self) -> Vec<(String, String, bool)> {
        MOTEURS_INTEGRES
            .iter()
            .map(|m| (m.cle.to_string(), m.nom.to_string(), false))
            .chain(
                self.perso
                    .iter()
                    .map(|(k, m)| (k.clone(), m.name.clone(), true)),
            )
            .collect()
    }

    pub fn nom(&self, cle: &str) -> Option<String> {
        integre(cle)
            .map(|m| m.nom.to_string())
            .or_else(|| self.perso.get(cle).map(|m| m.name.clone()))
    }

    /// Ajout : clé dérivée du nom (écrase un moteur perso de même clé), puis sélection.
    pub fn ajoute(&mut self, nom: &str, url: &str, icone: &str) -> Result<String, ErreurValidation> {
        let nom = valide_nom(nom)?;
        let cle = cle_moteur(&nom);
        if cle.is_empty() {
            return Err(ErreurValidation::Vide);
        }
        if integre(&cle).is_some() {
            return Err(ErreurValidation::Doublon);
        }
        self.enregistre(&cle, &nom, url, icone)?;
        Ok(cle)
    }

    pub fn modifie(
        &mut self,
        cle: &str,
        nom: &str,
        url: &str,
        icone: &str,
    ) -> Result<(), ErreurValidation> {
        if !self.perso.contains_key(cle) {
            return Err(ErreurValidation::Vide);
        }
        let nom = valide_nom(nom)?;
        self.enregistre(cle, &nom, url, icone)
    }

    fn enregistre(
        &mut self,
        cle: &str,
        nom: &str,
        url: &str,
        icone: &str,
    ) -> Result<(), ErreurValidation> {
        let url = url.trim();
        valide_url_moteur(url)?;
        let icone = icone.trim();
        self.perso.insert(
            cle.to_string(),
            MoteurPerso {
                name: nom.to_string(),
                url: url.to_string(),
                icon: (!icone.is_empty()).then(|| icone.to_string()),
            },
        );
        self.selection = cle.to_string();
        Ok(())
    }

    /// Suppression d’un moteur perso ; la sélection retombe sur le défaut.
    pub fn supprime(&mut self, cle: &str) -> Option<MoteurPerso> {
        let m = self.perso.remove(cle)?;
        if self.selection == cle {
            self.selection = MOTEUR_DEFAUT.to_string();
        }
        Some(m)
    }

    pub fn url_recherche(&self, cle: &str, requete: &str) -> Option<String> {
        let q = urlencoding::encode(requete);
        if let Some(m) = self.perso.get(cle) {
            return Some(m.url.replacen(MARQUEUR_RECHERCHE, &q, 1));
        }
        integre(cle).map(|m| format!("{}{q}", m.prefixe))
    }

    /// Icône du moteur : intégrée, saisie, ou service secondaire sur l’hôte de l’URL.
    pub fn icone(&self, cle: &str) -> Icone {
        if let Some(m) = integre(cle) {
            return Icone::Distante(m.icone.to_string());
        }
        match self.perso.get(cle) {
            Some(m) => match m.icone_saisie() {
                Some(i) => Icone::Distante(i.to_string()),
                None => icone_recherche_defaut(&m.url),
            },
            None => Icone::Glyphe(Glyphe::Recherche),
        }
    }
}

/// Service secondaire (128 px) sur l’hôte ; glyphe si l’URL est illisible.
pub fn icone_recherche_defaut(url: &str) -> Icone {
    match Url::parse(url).ok().as_ref().and_then(Url::host_str) {
        Some(h) => Icone::Distante(url_service_secours(h, 128)),
        None => Icone::Glyphe(Glyphe::Recherche),
    }
}

/// Candidats d’icône dans l’ordre d’essai (le premier qui se charge gagne).
pub fn candidats_icone_moteur(url: &str) -> Vec<Icone> {
    let Some(h) = Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_string)) else {
        return vec![Icone::Glyphe(Glyphe::Recherche)];
    };
    vec![
        Icone::Distante(format!("https://{h}/favicon.ico")),
        Icone::Distante(format!("https://{h}/assets/favicon.ico")),
        Icone::Distante(format!("https://{h}/assets/images/favicon.ico")),
        Icone::Distante(url_service_secours(&h, 128)),
        Icone::Glyphe(Glyphe::Recherche),
    ]
}

/* ------------------------ Barre de recherche ------------------------ */

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CibleRecherche {
    Navigation(String),
    Recherche(String),
}

impl CibleRecherche {
    pub fn url(&self) -> &str {
        match self {
            CibleRecherche::Navigation(u) | CibleRecherche::Recherche(u) => u,
        }
    }
}

/// Adresse reconnue : navigation directe (http:// pour localhost, https:// sinon).
/// Sinon recherche avec le moteur sélectionné. None si saisie vide.
pub fn cible_recherche(saisie: &str, moteurs: &Moteurs) -> Option<CibleRecherche> {
    if saisie.is_empty() {
        return None;
    }
    if est_url_navigateur(saisie) {
        let s = saisie.trim();
        let url = if s.contains("://") {
            s.to_string()
        } else if s.starts_with("localhost") {
            format!("http://{s}")
        } else {
            format!("https://{s}")
        };
        return Some(CibleRecherche::Navigation(url));
    }
    moteurs
        .url_recherche(moteurs.selection(), saisie)
        .map(CibleRecherche::Recherche)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cle_derivee_du_nom() {
        assert_eq!(cle_moteur("Startpage"), "startpage");
        assert_eq!(cle_moteur("My Engine #2!"), "myengine2");
        assert_eq!(cle_moteur("Qwant (FR)"), "qwantfr");
        assert_eq!(cle_moteur("é"), "");
    }

    #[test]
    fn url_moteur_validee() {
        assert!(valide_url_moteur("https://s.example/?q={searchTerm}").is_ok());
        assert_eq!(
            valide_url_moteur("https://s.example/?q="),
            Err(ErreurValidation::SansMarqueur)
        );
        assert_eq!(
            valide_url_moteur("ftp://s.example/{searchTerm}"),
            Err(ErreurValidation::ProtocoleMoteur)
        );
        assert_eq!(
            valide_url_moteur("s.example/{searchTerm}"),
            Err(ErreurValidation::UrlInvalide)
        );
    }

    #[test]
    fn recherche_integree_encodee() {
        let m = Moteurs::default();
        assert_eq!(
            m.url_recherche("ddg", "a b&c").as_deref(),
            Some("https://duckduckgo.com/?q=a%20b%26c")
        );
        assert_eq!(m.url_recherche("inconnu", "x"), None);
    }

    #[test]
    fn moteur_perso_cycle_de_vie() {
        let mut m = Moteurs::default();
        let cle = m
            .ajoute("Start Page", "https://startpage.com/do?q={searchTerm}", "")
            .unwrap();
        assert_eq!(cle, "startpage");
        assert_eq!(m.selection(), "startpage");
        assert_eq!(
            m.url_recherche("startpage", "rust lang").as_deref(),
            Some("https://startpage.com/do?q=rust%20lang")
        );
        assert_eq!(
            m.icone("startpage"),
            Icone::Distante("https://www.google.com/s2/favicons?domain=startpage.com&sz=128".into())
        );

        m.modifie("startpage", "SP", "https://sp.example/{searchTerm}", "https://sp.example/i.png")
            .unwrap();
        assert_eq!(m.nom("startpage").as_deref(), Some("SP"));
        assert_eq!(m.icone("startpage"), Icone::Distante("https://sp.example/i.png".into()));

        assert!(m.supprime("startpage").is_some());
        assert_eq!(m.selection(), MOTEUR_DEFAUT);
        assert!(!m.existe("startpage"));
    }

    #[test]
    fn ajout_refuse() {
        let mut m = Moteurs::default();
        assert_eq!(m.ajoute("!!!", "https://x/{searchTerm}", ""), Err(ErreurValidation::Vide));
        assert_eq!(
            m.ajoute("Google", "https://x/{searchTerm}", ""),
            Err(ErreurValidation::Doublon)
        );
        assert_eq!(
            m.ajoute("X", "https://x.example/", ""),
            Err(ErreurValidation::SansMarqueur)
        );
        assert!(m.perso().is_empty());
    }

    #[test]
    fn derniere_selection_restauree_si_connue() {
        let mut perso = BTreeMap::new();
        perso.insert(
            "perso".to_string(),
            MoteurPerso {
                name: "Perso".into(),
                url: "https://p.example/{searchTerm}".into(),
                icon: None,
            },
        );
        assert_eq!(Moteurs::new(perso.clone(), Some("perso")).selection(), "perso");
        assert_eq!(Moteurs::new(perso.clone(), Some("brave")).selection(), "brave");
        assert_eq!(Moteurs::new(perso, Some("disparu")).selection(), "google");
    }

    #[test]
    fn aiguillage_navigation_ou_recherche() {
        let m = Moteurs::default();
        assert_eq!(cible_recherche("", &m), None);
        assert_eq!(
            cible_recherche("localhost:3000", &m),
            Some(CibleRecherche::Navigation("http://localhost:3000".into()))
        );
        assert_eq!(
            cible_recherche(" example.com/a ", &m),
            Some(CibleRecherche::Navigation("https://example.com/a".into()))
        );
        assert_eq!(
            cible_recherche("http://example.com", &m),
            Some(CibleRecherche::Navigation("http://example.com".into()))
        );
        assert_eq!(
            cible_recherche("rust traits", &m),
            Some(CibleRecherche::Recherche(
                "https://www.google.com/search?q=rust%20traits".into()
            ))
        );
    }

    #[test]
    fn candidats_icone() {
        let c = candidats_icone_moteur("https://search.example/?q={searchTerm}");
        assert_eq!(c.len(), 5);
        assert_eq!(c[0], Icone::Distante("https://search.example/favicon.ico".into()));
        assert_eq!(c[4], Icone::Glyphe(Glyphe::Recherche));
        assert_eq!(
            candidats_icone_moteur("pas une url"),
            vec![Icone::Glyphe(Glyphe::Recherche)]
        );
    }
}
