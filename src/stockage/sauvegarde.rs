// src/stockage/sauvegarde.rs
//
// Export / import des données utilisateur (document JSON autonome).
// Import tolérant : chaque partie n’est appliquée que si elle a le bon type.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::{cles, ErreurStockage, Meteo, Parametres, Stockage};
use crate::moteurs::MoteurPerso;
use crate::signets::{liste_valide, Signet};

pub const PREFIXE_FICHIER: &str = "onglet_backup_";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sauvegarde {
    pub bookmarks: Vec<Signet>,
    pub deleted_defaults: Vec<String>,
    pub custom_search_engines: BTreeMap<String, MoteurPerso>,
    pub settings: Parametres,
    pub weather: Meteo,
}

impl Sauvegarde {
    pub fn vers_json(&self) -> Result<String, ErreurStockage> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub fn exporte(s: &Stockage) -> Sauvegarde {
    Sauvegarde {
        bookmarks: s.signets(),
        deleted_defaults: s.defauts_supprimes(),
        custom_search_engines: s.moteurs_perso(),
        settings: s.parametres(),
        weather: s.meteo(),
    }
}

/// `onglet_backup_2024-05-01T12-30-00.json` (UTC, sans ':').
pub fn nom_fichier(instant: DateTime<Utc>) -> String {
    format!("{PREFIXE_FICHIER}{}.json", instant.format("%Y-%m-%dT%H-%M-%S"))
}

pub fn exporte_vers(s: &Stockage, dossier: &Path) -> Result<PathBuf, ErreurStockage> {
    let chemin = dossier.join(nom_fichier(Utc::now()));
    fs::write(&chemin, exporte(s).vers_json()?)?;
    info!(chemin = %chemin.display(), "sauvegarde exportée");
    Ok(chemin)
}

const PARAMETRES_BOOLEENS: [(&str, &str); 6] = [
    ("hideAddButton", cles::MASQUER_AJOUT),
    ("allowLocalUrls", cles::URLS_LOCALES),
    ("weatherWidget", cles::WIDGET_METEO),
    ("timeWidget", cles::WIDGET_HEURE),
    ("calendarWidget", cles::WIDGET_CALENDRIER),
    ("calculatorWidget", cles::WIDGET_CALCULATRICE),
];

/// Applique un document de sauvegarde ; renvoie les clés écrites.
pub fn importe(s: &mut Stockage, texte: &str) -> Result<Vec<&'static str>, ErreurStockage> {
    let doc: Value = serde_json::from_str(texte)
        .map_err(|e| ErreurStockage::SauvegardeInvalide(e.to_string()))?;
    let Value::Object(doc) = doc else {
        return Err(ErreurStockage::SauvegardeInvalide("objet JSON attendu".into()));
    };

    let mut ecrites = Vec::new();

    if let Some(v @ Value::Array(_)) = doc.get("bookmarks") {
        match serde_json::from_value::<Vec<Signet>>(v.clone()) {
            Ok(signets) if liste_valide(&signets) => {
                s.ecrit(cles::SIGNETS, &signets)?;
                ecrites.push(cles::SIGNETS);
            }
            _ => warn!("import: signets invalides ignorés"),
        }
    }

    if let Some(Value::Array(a)) = doc.get("deletedDefaults") {
        let urls: Vec<&str> = a.iter().filter_map(Value::as_str).collect();
        s.ecrit(cles::DEFAUTS_SUPPRIMES, &urls)?;
        ecrites.push(cles::DEFAUTS_SUPPRIMES);
    }

    if let Some(v @ Value::Object(_)) = doc.get("customSearchEngines") {
        match serde_json::from_value::<BTreeMap<String, MoteurPerso>>(v.clone()) {
            Ok(m) => {
                s.ecrit(cles::MOTEURS_PERSO, &m)?;
                ecrites.push(cles::MOTEURS_PERSO);
            }
            Err(e) => warn!(erreur = %e, "import: moteurs invalides ignorés"),
        }
    }

    if let Some(Value::Object(p)) = doc.get("settings") {
        for (champ, cle) in PARAMETRES_BOOLEENS {
            if let Some(b) = p.get(champ).and_then(Value::as_bool) {
                s.ecrit_booleen(cle, b)?;
                ecrites.push(cle);
            }
        }
    }

    if let Some(Value::Object(m)) = doc.get("weather") {
        for (champ, cle) in [("city", cles::VILLE_METEO), ("country", cles::PAYS_METEO)] {
            if let Some(t) = m.get(champ).and_then(Value::as_str).filter(|t| !t.is_empty()) {
                s.ecrit_brut(cle, t.to_string())?;
                ecrites.push(cle);
            }
        }
    }

    info!(n = ecrites.len(), "sauvegarde importée");
    Ok(ecrites)
}

pub fn importe_depuis(s: &mut Stockage, chemin: &Path) -> Result<Vec<&'static str>, ErreurStockage> {
    let texte = fs::read_to_string(chemin)?;
    importe(s, &texte)
}
