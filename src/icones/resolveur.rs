// src/icones/resolveur.rs

use std::time::Duration;

use tracing::debug;
use url::Url;

use super::hote::est_adresse_locale;
use super::source::{CacheIcones, SourceIcones};
use super::{url_service_principal, url_service_secours, Glyphe, Icone};

const TAILLE_SECOURS: u32 = 32;

pub struct ResolveurIcones<S> {
    cache: CacheIcones<S>,
    delai: Duration,
}

impl<S: SourceIcones + 'static> ResolveurIcones<S> {
    pub fn new(source: S, delai: Duration) -> Self {
        Self {
            cache: CacheIcones::new(source),
            delai,
        }
    }

    pub async fn resolve(&self, url: &str, icone_utilisateur: Option<&str>) -> Icone {
        if let Some(u) = icone_utilisateur.map(str::trim).filter(|u| !u.is_empty()) {
            return Icone::Distante(u.to_string());
        }

        let parsee = match Url::parse(url) {
            Ok(p) => p,
            Err(e) => {
                debug!(url, erreur = %e, "URL illisible, service secondaire");
                return Icone::Distante(url_service_secours(url, TAILLE_SECOURS));
            }
        };

        // jamais de requête tierce pour une cible locale
        if est_adresse_locale(&parsee) {
            return Icone::Glyphe(Glyphe::Globe);
        }

        let Some(domaine) = parsee.host_str() else {
            return Icone::Distante(url_service_secours(url, TAILLE_SECOURS));
        };

        if let Some(carte) = self.cache.carte().await {
            if let Some(i) = carte.get(domaine) {
                return Icone::Distante(i.clone());
            }
        }

        Icone::Distante(url_service_principal(domaine))
    }

    /// Course contre le délai : au-delà, glyphe (la résolution lente est abandonnée).
    pub async fn resolve_avec_delai(&self, url: &str, icone_utilisateur: Option<&str>) -> Icone {
        match tokio::time::timeout(self.delai, self.resolve(url, icone_utilisateur)).await {
            Ok(i) => i,
            Err(_) => {
                debug!(url, delai_ms = self.delai.as_millis() as u64, "icône: délai dépassé");
                Icone::Glyphe(Glyphe::Globe)
            }
        }
    }
}
