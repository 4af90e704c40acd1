// src/app/icones.rs
//
// Pont UI <-> résolveur async : la vue demande une icône à chaque frame,
// la résolution tourne sur un runtime tokio dédié, le résultat est déposé
// dans une table partagée puis egui est réveillé (request_repaint).

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use eframe::egui;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use crate::config::Config;
use crate::icones::{ErreurIcone, Icone, ResolveurIcones, SourceHttp, SourceIcones};

const FILS_ICONES: usize = 2;

pub struct ServiceIcones<S = SourceHttp> {
    runtime: Runtime,
    resolveur: Arc<ResolveurIcones<S>>,
    resultats: Arc<Mutex<HashMap<String, Icone>>>,
    demandes: HashSet<String>,
}

impl ServiceIcones<SourceHttp> {
    pub fn new(config: &Config) -> Result<Self, ErreurIcone> {
        let source = SourceHttp::new(config.url_carte_icones.clone(), config.delai_icones)?;
        Self::avec_source(source, config)
    }
}

impl<S: SourceIcones + 'static> ServiceIcones<S> {
    pub fn avec_source(source: S, config: &Config) -> Result<Self, ErreurIcone> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(FILS_ICONES)
            .thread_name("icones")
            .enable_all()
            .build()?;
        Ok(Self {
            runtime,
            resolveur: Arc::new(ResolveurIcones::new(source, config.delai_icones)),
            resultats: Arc::new(Mutex::new(HashMap::new())),
            demandes: HashSet::new(),
        })
    }

    /// Icône déjà résolue ; sinon None et la résolution part en tâche de fond (une fois).
    pub fn icone(
        &mut self,
        ctx: &egui::Context,
        url: &str,
        icone_utilisateur: Option<&str>,
    ) -> Option<Icone> {
        let cle = format!("{url}\u{1f}{}", icone_utilisateur.unwrap_or(""));

        if let Some(i) = verrou(&self.resultats).get(&cle) {
            return Some(i.clone());
        }

        if self.demandes.insert(cle.clone()) {
            let resolveur = Arc::clone(&self.resolveur);
            let resultats = Arc::clone(&self.resultats);
            let ctx = ctx.clone();
            let url = url.to_string();
            let perso = icone_utilisateur.map(str::to_string);

            self.runtime.spawn(async move {
                let i = resolveur.resolve_avec_delai(&url, perso.as_deref()).await;
                debug!(url = %url, icone = ?i, "icône résolue");
                verrou(&resultats).insert(cle, i);
                ctx.request_repaint();
            });
        }

        None
    }

    #[cfg(test)]
    pub fn en_attente(&self) -> usize {
        let faits = verrou(&self.resultats).len();
        self.demandes.len().saturating_sub(faits)
    }
}

/// Verrou de la table des résultats, repris même empoisonné.
fn verrou(m: &Mutex<HashMap<String, Icone>>) -> MutexGuard<'_, HashMap<String, Icone>> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
