//! src/stockage/mod.rs
//!
//! Stockage clé/valeur local : un document JSON sur disque `{clé: valeur brute}`.
//!
//! - lecture tolérante : donnée absente ou invalide => valeur par défaut (journalisé)
//! - écriture sous quota (5 Mio, taille estimée en UTF-16 : 2 octets / unité)
//! - dépassement => `ErreurStockage::QuotaDepasse` (la vue propose le gestionnaire)
//!
//! Une séquence lecture-modification-écriture n’est pas atomique entre deux
//! instances ouvertes sur le même fichier : la dernière écriture gagne.

pub mod sauvegarde;

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::moteurs::MoteurPerso;
use crate::noyau::Mode;
use crate::signets::{liste_valide, Signet};

/// Clés du document (identiques à celles de la page d’origine).
pub mod cles {
    pub const SIGNETS: &str = "bookmarks";
    pub const DEFAUTS_SUPPRIMES: &str = "deletedDefaults";
    pub const MOTEURS_PERSO: &str = "customSearchEngines";
    pub const DERNIER_MOTEUR: &str = "lastSelectedEngine";
    pub const MODE_CALCULATRICE: &str = "calculatorMode";
    pub const URLS_LOCALES: &str = "allowLocalUrls";
    pub const MASQUER_AJOUT: &str = "hideAddButton";
    pub const WIDGET_METEO: &str = "weatherWidget";
    pub const WIDGET_HEURE: &str = "timeWidget";
    pub const WIDGET_CALENDRIER: &str = "calendarWidget";
    pub const WIDGET_CALCULATRICE: &str = "calculatorWidget";
    pub const VILLE_METEO: &str = "weatherCity";
    pub const PAYS_METEO: &str = "weatherCountry";
    pub const DEJA_VISITE: &str = "hasVisited";
}

pub const QUOTA_OCTETS: usize = 5 * 1024 * 1024;

pub const VILLE_DEFAUT: &str = "Dhaka";
pub const PAYS_DEFAUT: &str = "BD";

#[derive(Debug, Error)]
pub enum ErreurStockage {
    #[error("Stockage plein ({pourcentage:.1}% utilisé)")]
    QuotaDepasse { pourcentage: f64 },

    #[error("sérialisation: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("fichier de stockage: {0}")]
    Io(#[from] io::Error),

    #[error("sauvegarde invalide: {0}")]
    SauvegardeInvalide(String),
}

/// Taille estimée d’une valeur (unités UTF-16, 2 octets chacune).
pub fn taille_octets(valeur: &str) -> usize {
    valeur.encode_utf16().count() * 2
}

/// Données du gestionnaire de stockage.
#[derive(Clone, Debug, PartialEq)]
pub struct InfoStockage {
    pub total_octets: usize,
    pub entrees: Vec<(String, usize)>,
}

impl InfoStockage {
    pub fn pourcentage(&self) -> f64 {
        self.total_octets as f64 / QUOTA_OCTETS as f64 * 100.0
    }

    pub fn total_ko(&self) -> String {
        format_ko(self.total_octets)
    }

    pub fn pourcentage_texte(&self) -> String {
        format!("{:.1}%", self.pourcentage())
    }
}

pub fn format_ko(octets: usize) -> String {
    format!("{:.2} KB", octets as f64 / 1024.0)
}

/// Réglages d’affichage (exportés avec les sauvegardes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parametres {
    pub hide_add_button: bool,
    pub allow_local_urls: bool,
    pub weather_widget: bool,
    pub time_widget: bool,
    pub calendar_widget: bool,
    pub calculator_widget: bool,
}

impl Default for Parametres {
    fn default() -> Self {
        Self {
            hide_add_button: false,
            allow_local_urls: false,
            weather_widget: true,
            time_widget: true,
            calendar_widget: false,
            calculator_widget: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meteo {
    pub city: String,
    pub country: String,
}

impl Default for Meteo {
    fn default() -> Self {
        Self {
            city: VILLE_DEFAUT.to_string(),
            country: PAYS_DEFAUT.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Stockage {
    chemin: Option<PathBuf>,
    entrees: BTreeMap<String, String>,
}

impl Stockage {
    /// Sans fichier.
    #[cfg(test)]
    pub fn en_memoire() -> Self {
        Self::default()
    }

    /// Fichier absent : document vide, créé à la première écriture.
    pub fn ouvre(chemin: impl Into<PathBuf>) -> Result<Self, ErreurStockage> {
        let chemin = chemin.into();
        let entrees = match fs::read_to_string(&chemin) {
            Ok(texte) if texte.trim().is_empty() => BTreeMap::new(),
            Ok(texte) => serde_json::from_str(&texte)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(chemin = %chemin.display(), n = entrees.len(), "stockage ouvert");
        Ok(Self {
            chemin: Some(chemin),
            entrees,
        })
    }

    pub fn chemin(&self) -> Option<&Path> {
        self.chemin.as_deref()
    }

    /* ------------------------ Brut ------------------------ */

    /// Valeur brute ; une chaîne vide compte comme absente.
    pub fn lit_brut(&self, cle: &str) -> Option<&str> {
        self.entrees
            .get(cle)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn ecrit_brut(&mut self, cle: &str, valeur: String) -> Result<(), ErreurStockage> {
        let ancien = self.entrees.get(cle).map_or(0, |v| taille_octets(v));
        let total = self.total_octets() - ancien + taille_octets(&valeur);
        if total > QUOTA_OCTETS {
            let info = self.info();
            warn!(cle, total, "quota de stockage dépassé");
            return Err(ErreurStockage::QuotaDepasse {
                pourcentage: info.pourcentage(),
            });
        }
        let ancienne = self.entrees.insert(cle.to_string(), valeur);
        if let Err(e) = self.persiste() {
            // mémoire alignée sur le disque
            match ancienne {
                Some(v) => self.entrees.insert(cle.to_string(), v),
                None => self.entrees.remove(cle),
            };
            return Err(e);
        }
        Ok(())
    }

    /* ------------------------ JSON ------------------------ */

    /// Valeur JSON ; illisible => None (journalisé).
    pub fn lit<T: DeserializeOwned>(&self, cle: &str) -> Option<T> {
        let brut = self.lit_brut(cle)?;
        match serde_json::from_str(brut) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(cle, erreur = %e, "lecture stockage: valeur invalide");
                None
            }
        }
    }

    pub fn ecrit<T: Serialize + ?Sized>(&mut self, cle: &str, valeur: &T) -> Result<(), ErreurStockage> {
        let texte = serde_json::to_string(valeur)?;
        self.ecrit_brut(cle, texte)
    }

    pub fn supprime(&mut self, cle: &str) -> Result<(), ErreurStockage> {
        if let Some(ancienne) = self.entrees.remove(cle) {
            if let Err(e) = self.persiste() {
                self.entrees.insert(cle.to_string(), ancienne);
                return Err(e);
            }
        }
        Ok(())
    }

    pub fn vide_tout(&mut self) -> Result<(), ErreurStockage> {
        let anciennes = std::mem::take(&mut self.entrees);
        if let Err(e) = self.persiste() {
            self.entrees = anciennes;
            return Err(e);
        }
        Ok(())
    }

    pub fn info(&self) -> InfoStockage {
        let entrees: Vec<(String, usize)> = self
            .entrees
            .iter()
            .map(|(k, v)| (k.clone(), taille_octets(v)))
            .collect();
        InfoStockage {
            total_octets: entrees.iter().map(|(_, n)| n).sum(),
            entrees,
        }
    }

    fn total_octets(&self) -> usize {
        self.entrees.values().map(|v| taille_octets(v)).sum()
    }

    fn persiste(&self) -> Result<(), ErreurStockage> {
        let Some(chemin) = &self.chemin else {
            return Ok(());
        };
        let texte = serde_json::to_string_pretty(&self.entrees)?;
        // écriture dans un fichier voisin puis renommage
        let tmp = chemin.with_extension("json.tmp");
        fs::write(&tmp, texte)?;
        fs::rename(&tmp, chemin)?;
        Ok(())
    }

    /* ------------------------ Lectures typées (validées par clé) ------------------------ */

    pub fn signets(&self) -> Vec<Signet> {
        match self.lit::<Vec<Signet>>(cles::SIGNETS) {
            Some(v) if liste_valide(&v) => v,
            Some(_) => {
                warn!("signets stockés invalides, liste vide");
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    /// Seules les chaînes sont gardées.
    pub fn defauts_supprimes(&self) -> Vec<String> {
        self.lit::<Vec<serde_json::Value>>(cles::DEFAUTS_SUPPRIMES)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    pub fn moteurs_perso(&self) -> BTreeMap<String, MoteurPerso> {
        self.lit(cles::MOTEURS_PERSO).unwrap_or_default()
    }

    pub fn dernier_moteur(&self) -> Option<String> {
        self.lit_brut(cles::DERNIER_MOTEUR).map(str::to_string)
    }

    pub fn mode_calculatrice(&self) -> Mode {
        self.lit_brut(cles::MODE_CALCULATRICE)
            .map(Mode::depuis_cle)
            .unwrap_or_default()
    }

    /// Booléen stocké "true"/"false" ; autre valeur => défaut.
    pub fn booleen(&self, cle: &str, defaut: bool) -> bool {
        match self.lit_brut(cle) {
            Some("true") => true,
            Some("false") => false,
            _ => defaut,
        }
    }

    pub fn ecrit_booleen(&mut self, cle: &str, v: bool) -> Result<(), ErreurStockage> {
        self.ecrit_brut(cle, v.to_string())
    }

    pub fn parametres(&self) -> Parametres {
        let d = Parametres::default();
        Parametres {
            hide_add_button: self.booleen(cles::MASQUER_AJOUT, d.hide_add_button),
            allow_local_urls: self.booleen(cles::URLS_LOCALES, d.allow_local_urls),
            weather_widget: self.booleen(cles::WIDGET_METEO, d.weather_widget),
            time_widget: self.booleen(cles::WIDGET_HEURE, d.time_widget),
            calendar_widget: self.booleen(cles::WIDGET_CALENDRIER, d.calendar_widget),
            calculator_widget: self.booleen(cles::WIDGET_CALCULATRICE, d.calculator_widget),
        }
    }

    pub fn ecrit_parametres(&mut self, p: &Parametres) -> Result<(), ErreurStockage> {
        self.ecrit_booleen(cles::MASQUER_AJOUT, p.hide_add_button)?;
        self.ecrit_booleen(cles::URLS_LOCALES, p.allow_local_urls)?;
        self.ecrit_booleen(cles::WIDGET_METEO, p.weather_widget)?;
        self.ecrit_booleen(cles::WIDGET_HEURE, p.time_widget)?;
        self.ecrit_booleen(cles::WIDGET_CALENDRIER, p.calendar_widget)?;
        self.ecrit_booleen(cles::WIDGET_CALCULATRICE, p.calculator_widget)
    }

    pub fn meteo(&self) -> Meteo {
        let d = Meteo::default();
        Meteo {
            city: self.lit_brut(cles::VILLE_METEO).map_or(d.city, str::to_string),
            country: self.lit_brut(cles::PAYS_METEO).map_or(d.country, str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lecture_tolerante() {
        let mut s = Stockage::en_memoire();
        assert!(s.signets().is_empty());

        s.ecrit_brut(cles::SIGNETS, "pas du json".into()).unwrap();
        assert!(s.signets().is_empty());

        // liste syntaxiquement correcte mais signet invalide
        s.ecrit_brut(cles::SIGNETS, r#"[{"name":"","url":"https://a.com"}]"#.into())
            .unwrap();
        assert!(s.signets().is_empty());

        s.ecrit(cles::SIGNETS, &[Signet::new("A", "https://a.com")]).unwrap();
        assert_eq!(s.signets().len(), 1);
    }

    #[test]
    fn defauts_supprimes_filtres() {
        let mut s = Stockage::en_memoire();
        s.ecrit_brut(cles::DEFAUTS_SUPPRIMES, r#"["https://a.com", 3, null, "b"]"#.into())
            .unwrap();
        assert_eq!(s.defauts_supprimes(), ["https://a.com", "b"]);
    }

    #[test]
    fn booleens_et_mode() {
        let mut s = Stockage::en_memoire();
        assert!(s.booleen(cles::WIDGET_METEO, true));
        s.ecrit_booleen(cles::WIDGET_METEO, false).unwrap();
        assert!(!s.booleen(cles::WIDGET_METEO, true));
        s.ecrit_brut(cles::URLS_LOCALES, "oui".into()).unwrap();
        assert!(!s.booleen(cles::URLS_LOCALES, false));

        assert_eq!(s.mode_calculatrice(), Mode::Basique);
        s.ecrit_brut(cles::MODE_CALCULATRICE, Mode::Scientifique.cle().into())
            .unwrap();
        assert_eq!(s.mode_calculatrice(), Mode::Scientifique);
    }

    #[test]
    fn quota_depasse() {
        let mut s = Stockage::en_memoire();
        // 2 Mio d’unités => 4 Mio estimés
        s.ecrit_brut("a", "x".repeat(2 * 1024 * 1024)).unwrap();
        let e = s.ecrit_brut("b", "y".repeat(1024 * 1024)).unwrap_err();
        match e {
            ErreurStockage::QuotaDepasse { pourcentage } => {
                assert!((pourcentage - 80.0).abs() < 1e-9, "{pourcentage}");
            }
            autre => panic!("attendu QuotaDepasse, obtenu {autre:?}"),
        }
        assert!(s.lit_brut("b").is_none());

        // remplacer une valeur libère son ancienne taille
        s.ecrit_brut("a", "z".repeat(2 * 1024 * 1024)).unwrap();
    }

    #[test]
    fn taille_utf16() {
        assert_eq!(taille_octets("abc"), 6);
        assert_eq!(taille_octets("é"), 2);
        assert_eq!(taille_octets("𝄞"), 4);
    }

    #[test]
    fn info_et_suppression() {
        let mut s = Stockage::en_memoire();
        s.ecrit_brut("k1", "ab".into()).unwrap();
        s.ecrit_brut("k2", "abcd".into()).unwrap();
        let i = s.info();
        assert_eq!(i.total_octets, 12);
        assert_eq!(i.entrees, vec![("k1".to_string(), 4), ("k2".to_string(), 8)]);
        assert_eq!(format_ko(1536), "1.50 KB");

        s.supprime("k1").unwrap();
        assert_eq!(s.info().total_octets, 8);
        s.vide_tout().unwrap();
        assert_eq!(s.info().total_octets, 0);
        assert_eq!(s.info().pourcentage_texte(), "0.0%");
    }

    #[test]
    fn persistance_sur_disque() {
        let dir = tempfile::tempdir().unwrap();
        let chemin = dir.path().join("donnees.json");

        let mut s = Stockage::ouvre(&chemin).unwrap();
        s.ecrit_brut(cles::DERNIER_MOTEUR, "ddg".into()).unwrap();
        s.ecrit_parametres(&Parametres {
            allow_local_urls: true,
            ..Parametres::default()
        })
        .unwrap();

        let relu = Stockage::ouvre(&chemin).unwrap();
        assert_eq!(relu.dernier_moteur().as_deref(), Some("ddg"));
        assert!(relu.parametres().allow_local_urls);
        assert!(relu.parametres().weather_widget);
        assert_eq!(relu.meteo(), Meteo::default());
    }

    #[test]
    fn document_corrompu_refuse() {
        let dir = tempfile::tempdir().unwrap();
        let chemin = dir.path().join("donnees.json");
        fs::write(&chemin, "{ pas du json").unwrap();
        assert!(matches!(
            Stockage::ouvre(&chemin),
            Err(ErreurStockage::Serde(_))
        ));
    }

    #[test]
    fn echec_disque_memoire_intacte() {
        let dir = tempfile::tempdir().unwrap();
        let chemin = dir.path().join("donnees.json");
        let mut s = Stockage::ouvre(&chemin).unwrap();
        s.ecrit_brut("k", "1".into()).unwrap();

        // un dossier à la place du fichier temporaire : toute écriture échoue
        fs::create_dir(chemin.with_extension("json.tmp")).unwrap();

        assert!(matches!(s.ecrit_brut("k", "2".into()), Err(ErreurStockage::Io(_))));
        assert_eq!(s.lit_brut("k"), Some("1"));
        assert!(s.ecrit_brut("neuf", "x".into()).is_err());
        assert_eq!(s.lit_brut("neuf"), None);
        assert!(s.supprime("k").is_err());
        assert_eq!(s.lit_brut("k"), Some("1"));
        assert!(s.vide_tout().is_err());
        assert_eq!(s.lit_brut("k"), Some("1"));

        let relu = Stockage::ouvre(&chemin).unwrap();
        assert_eq!(relu.lit_brut("k"), Some("1"));
    }
}
