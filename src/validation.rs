// src/validation.rs
//
// Validation des saisies utilisateur (formulaires signets / moteurs)
// + détection “est-ce une URL ?” pour la barre de recherche.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use url::Url;

use crate::icones::hote::est_hote_local;

pub const LONGUEUR_MAX_DEFAUT: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErreurValidation {
    #[error("Saisie invalide")]
    Vide,

    #[error("La saisie doit faire moins de {0} caractères")]
    TropLong(usize),

    #[error("La saisie doit faire au moins {0} caractères")]
    TropCourt(usize),

    #[error("Le nom contient des caractères invalides")]
    CaracteresInvalides,

    #[error("Veuillez saisir une URL valide")]
    UrlInvalide,

    #[error("Seuls les protocoles {0} sont autorisés")]
    ProtocoleInterdit(String),

    #[error("Adresses locales interdites. Activez les URL locales dans les paramètres.")]
    AdresseLocale,

    #[error("Ce signet existe déjà")]
    Doublon,

    #[error("Limite de {0} signets atteinte")]
    LimiteAtteinte(usize),

    #[error("L’URL doit contenir le marqueur {{searchTerm}}")]
    SansMarqueur,

    #[error("L’URL doit commencer par http:// ou https://")]
    ProtocoleMoteur,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeSaisie {
    Texte,
    Url,
}

#[derive(Clone, Copy, Debug)]
pub struct ReglesSaisie {
    pub max: usize,
    pub min: usize,
    pub type_saisie: TypeSaisie,
    pub optionnelle: bool,
}

impl Default for ReglesSaisie {
    fn default() -> Self {
        Self {
            max: LONGUEUR_MAX_DEFAUT,
            min: 1,
            type_saisie: TypeSaisie::Texte,
            optionnelle: false,
        }
    }
}

impl ReglesSaisie {
    pub fn url() -> Self {
        Self {
            type_saisie: TypeSaisie::Url,
            max: 2048,
            ..Self::default()
        }
    }

    pub fn optionnelle(mut self) -> Self {
        self.optionnelle = true;
        self
    }
}

const CARACTERES_INTERDITS: &[char] = &['<', '>', '{', '}', '(', ')', '[', ']', '\\', '/'];

/// Renvoie la valeur nettoyée (trim) ou la première règle violée.
pub fn valide_saisie(
    brut: &str,
    regles: &ReglesSaisie,
    locales_autorisees: bool,
) -> Result<String, ErreurValidation> {
    let valeur = brut.trim();

    if valeur.is_empty() {
        return if regles.optionnelle {
            Ok(String::new())
        } else {
            Err(ErreurValidation::Vide)
        };
    }

    let n = valeur.chars().count();
    if n > regles.max {
        return Err(ErreurValidation::TropLong(regles.max));
    }
    if n < regles.min {
        return Err(ErreurValidation::TropCourt(regles.min));
    }

    match regles.type_saisie {
        TypeSaisie::Url => valide_url(valeur, locales_autorisees)?,
        TypeSaisie::Texte => {
            if valeur.contains(CARACTERES_INTERDITS) {
                return Err(ErreurValidation::CaracteresInvalides);
            }
        }
    }

    Ok(valeur.to_string())
}

pub fn valide_nom(brut: &str) -> Result<String, ErreurValidation> {
    valide_saisie(brut, &ReglesSaisie::default(), false)
}

/// http/https (+ file: si locales autorisées) ; hôtes locaux refusés sinon.
pub fn valide_url(valeur: &str, locales_autorisees: bool) -> Result<(), ErreurValidation> {
    let url = Url::parse(valeur.trim()).map_err(|_| ErreurValidation::UrlInvalide)?;

    let mut protocoles = vec!["http", "https"];
    if locales_autorisees {
        protocoles.push("file");
    }
    if !protocoles.contains(&url.scheme()) {
        let liste = protocoles
            .iter()
            .map(|p| format!("{p}:"))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(ErreurValidation::ProtocoleInterdit(liste));
    }

    if !locales_autorisees && est_hote_local(&url) {
        return Err(ErreurValidation::AdresseLocale);
    }

    Ok(())
}

/* ------------------------ Barre de recherche ------------------------ */

static RE_LOCALHOST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^localhost(:\d+)?(/.*)?$").expect("motif localhost"));

static RE_DOMAINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^([a-zA-Z0-9-]+\.)*[a-zA-Z0-9-]+\.[a-zA-Z]{2,}(:\d+)?(/[^<>"]*)?$"#)
        .expect("motif domaine")
});

const PROTOCOLES_NAVIGATEUR: [&str; 4] = ["http", "https", "ftp", "file"];

/// Vrai si la saisie ressemble à une adresse qu’un navigateur accepterait.
pub fn est_url_navigateur(saisie: &str) -> bool {
    let s = saisie.trim();

    if RE_LOCALHOST.is_match(s) {
        return true;
    }

    if !s.contains("://") {
        return RE_DOMAINE.is_match(s);
    }

    let Ok(url) = Url::parse(s) else {
        return false;
    };
    if !PROTOCOLES_NAVIGATEUR.contains(&url.scheme()) {
        return false;
    }

    // “scheme:” retiré, le reste ne doit contenir ni espace ni <>"
    let reste = s.get(url.scheme().len() + 1..).unwrap_or("").trim();
    !reste.contains([' ', '<', '>', '"'])
}
