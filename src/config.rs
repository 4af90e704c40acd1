// src/config.rs
//
// Configuration (constantes + surcharge par variables d’environnement)
// - ONGLET_DONNEES          : chemin du document de stockage JSON
// - ONGLET_CARTE_ICONES     : URL de la carte domaine -> icône
// - ONGLET_DELAI_ICONES_MS  : délai client de résolution d’icône

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

const CHEMIN_DONNEES_DEFAUT: &str = "onglet_accueil.json";

const URL_CARTE_ICONES_DEFAUT: &str =
    "https://cdn.jsdelivr.net/gh/nazdridoy/nazhome@maintainAltIcons/alternativeIcons.json";

const DELAI_ICONES_DEFAUT_MS: u64 = 3_000;

const VAR_DONNEES: &str = "ONGLET_DONNEES";
const VAR_CARTE_ICONES: &str = "ONGLET_CARTE_ICONES";
const VAR_DELAI_ICONES: &str = "ONGLET_DELAI_ICONES_MS";

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub chemin_donnees: PathBuf,
    pub url_carte_icones: String,
    pub delai_icones: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chemin_donnees: PathBuf::from(CHEMIN_DONNEES_DEFAUT),
            url_carte_icones: URL_CARTE_ICONES_DEFAUT.to_string(),
            delai_icones: Duration::from_millis(DELAI_ICONES_DEFAUT_MS),
        }
    }
}

impl Config {
    pub fn depuis_env() -> Self {
        Self::depuis_variables(|nom| std::env::var(nom).ok())
    }

    /// Lecture injectable (tests) : `lire(nom)` renvoie la valeur de la variable.
    pub fn depuis_variables(lire: impl Fn(&str) -> Option<String>) -> Self {
        let mut c = Self::default();

        if let Some(v) = lire(VAR_DONNEES).filter(|v| !v.trim().is_empty()) {
            c.chemin_donnees = PathBuf::from(v);
        }
        if let Some(v) = lire(VAR_CARTE_ICONES).filter(|v| !v.trim().is_empty()) {
            c.url_carte_icones = v;
        }
        if let Some(v) = lire(VAR_DELAI_ICONES) {
            match v.trim().parse::<u64>() {
                Ok(ms) => c.delai_icones = Duration::from_millis(ms),
                Err(_) => warn!(
                    variable = VAR_DELAI_ICONES,
                    valeur = %v,
                    "délai invalide, valeur par défaut gardée"
                ),
            }
        }

        c
    }
}
