// src/signets.rs
//
// Signets : modèle, contrôle d’intégrité, liste ordonnée.
// - limite 100
// - doublon = même hôte + chemin (sans '/' final) + requête
// - signets par défaut : une suppression volontaire est mémorisée (deletedDefaults)

use serde::{Deserialize, Serialize};
use url::Url;

use crate::validation::{valide_saisie, ErreurValidation, ReglesSaisie};

pub const LIMITE_SIGNETS: usize = 100;
pub const LONGUEUR_NOM_MAX: usize = 50;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signet {
    pub name: String,
    pub url: String,
    #[serde(default, alias = "iconUrl", skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Signet {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            icon: None,
        }
    }

    /// Contrôle d’un signet relu depuis le stockage.
    pub fn est_valide(&self) -> bool {
        let n = self.name.chars().count();
        n > 0 && n < 100 && Url::parse(&self.url).is_ok()
    }
}

pub fn signets_par_defaut() -> Vec<Signet> {
    vec![
        Signet::new("Google", "https://www.google.com"),
        Signet::new("YouTube", "https://youtube.com"),
        Signet::new("Discord", "https://discord.com/channels/@me"),
    ]
}

fn est_defaut(url: &str) -> bool {
    signets_par_defaut().iter().any(|d| d.url == url)
}

pub fn liste_valide(signets: &[Signet]) -> bool {
    signets.len() <= LIMITE_SIGNETS && signets.iter().all(Signet::est_valide)
}

/// hôte + chemin sans '/' final + requête ; texte brut si illisible.
pub fn cle_normalisee(url: &str) -> String {
    match Url::parse(url) {
        Ok(u) => {
            let hote = u.host_str().unwrap_or("");
            let chemin = u.path().strip_suffix('/').unwrap_or(u.path());
            let requete = u.query().map(|q| format!("?{q}")).unwrap_or_default();
            format!("{hote}{chemin}{requete}")
        }
        Err(_) => url.to_string(),
    }
}

/// Saisie de formulaire (nom, url, icône optionnelle).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SaisieSignet {
    pub nom: String,
    pub url: String,
    pub icone: String,
}

impl SaisieSignet {
    pub fn depuis(s: &Signet) -> Self {
        Self {
            nom: s.name.clone(),
            url: s.url.clone(),
            icone: s.icon.clone().unwrap_or_default(),
        }
    }

    fn valide(&self, locales_autorisees: bool) -> Result<Signet, ErreurValidation> {
        let regles_nom = ReglesSaisie {
            max: LONGUEUR_NOM_MAX,
            ..ReglesSaisie::default()
        };
        let name = valide_saisie(&self.nom, &regles_nom, locales_autorisees)?;
        let url = valide_saisie(&self.url, &ReglesSaisie::url(), locales_autorisees)?;
        let icone = valide_saisie(
            &self.icone,
            &ReglesSaisie::url().optionnelle(),
            locales_autorisees,
        )?;
        Ok(Signet {
            name,
            url,
            icon: (!icone.is_empty()).then_some(icone),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListeSignets {
    signets: Vec<Signet>,
    defauts_supprimes: Vec<String>,
}

impl ListeSignets {
    pub fn new(signets: Vec<Signet>, defauts_supprimes: Vec<String>) -> Self {
        Self {
            signets,
            defauts_supprimes,
        }
    }

    pub fn signets(&self) -> &[Signet] {
        &self.signets
    }

    pub fn defauts_supprimes(&self) -> &[String] {
        &self.defauts_supprimes
    }

    /// `sauf` : index ignoré (édition d’un signet existant).
    pub fn est_doublon(&self, url: &str, sauf: Option<usize>) -> bool {
        let cle = cle_normalisee(url);
        self.signets
            .iter()
            .enumerate()
            .any(|(i, s)| Some(i) != sauf && cle_normalisee(&s.url) == cle)
    }

    pub fn ajoute(
        &mut self,
        saisie: &SaisieSignet,
        locales_autorisees: bool,
    ) -> Result<(), ErreurValidation> {
        if self.signets.len() >= LIMITE_SIGNETS {
            return Err(ErreurValidation::LimiteAtteinte(LIMITE_SIGNETS));
        }
        let s = saisie.valide(locales_autorisees)?;
        if self.est_doublon(&s.url, None) {
            return Err(ErreurValidation::Doublon);
        }
        self.signets.push(s);
        Ok(())
    }

    pub fn modifie(
        &mut self,
        index: usize,
        saisie: &SaisieSignet,
        locales_autorisees: bool,
    ) -> Result<(), ErreurValidation> {
        if index >= self.signets.len() {
            return Err(ErreurValidation::Vide);
        }
        let s = saisie.valide(locales_autorisees)?;
        if self.est_doublon(&s.url, Some(index)) {
            return Err(ErreurValidation::Doublon);
        }
        self.signets[index] = s;
        Ok(())
    }

    pub fn supprime(&mut self, index: usize) -> Option<Signet> {
        if index >= self.signets.len() {
            return None;
        }
        let s = self.signets.remove(index);
        if est_defaut(&s.url) && !self.defauts_supprimes.contains(&s.url) {
            self.defauts_supprimes.push(s.url.clone());
        }
        Some(s)
    }

    /// Glisser-déposer : `de` est retiré puis inséré à `vers`.
    pub fn deplace(&mut self, de: usize, vers: usize) -> bool {
        let n = self.signets.len();
        if de >= n || vers >= n || de == vers {
            return false;
        }
        let s = self.signets.remove(de);
        self.signets.insert(vers, s);
        true
    }

    /// Liste vide : les défauts. Sinon : défauts absents et non supprimés volontairement.
    /// Renvoie vrai si la liste a changé.
    pub fn ajoute_defauts_manquants(&mut self) -> bool {
        if self.signets.is_empty() {
            self.signets = signets_par_defaut();
            return true;
        }
        let manquants: Vec<Signet> = signets_par_defaut()
            .into_iter()
            .filter(|d| {
                !self.signets.iter().any(|s| s.url == d.url)
                    && !self.defauts_supprimes.contains(&d.url)
            })
            .collect();
        let change = !manquants.is_empty();
        self.signets.extend(manquants);
        self.signets.truncate(LIMITE_SIGNETS);
        change
    }

    /// Défauts en tête, puis signets personnels ; l’historique des suppressions est oublié.
    pub fn restaure_defauts(&mut self) {
        self.defauts_supprimes.clear();
        let perso = self.signets.drain(..).filter(|s| !est_defaut(&s.url));
        let mut tous = signets_par_defaut();
        tous.extend(perso);
        tous.truncate(LIMITE_SIGNETS);
        self.signets = tous;
    }
}
