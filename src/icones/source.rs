// src/icones/source.rs
//
// Source de la carte domaine -> icône + cache “single-flight”.
//
// - SourceIcones : seam async (HTTP en prod, mémoire en test)
// - CacheIcones  : chargée au plus une fois par session ; les appels
//                  concurrents pendant le premier chargement partagent la même requête.
//                  Un échec n’est PAS mémorisé (le prochain appel retente).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

/// domaine -> URL d’icône
pub type CarteIcones = HashMap<String, String>;

#[derive(Debug, Error)]
pub enum ErreurIcone {
    #[error("requête carte d’icônes: {0}")]
    Http(#[from] reqwest::Error),

    #[error("carte d’icônes: statut HTTP {0}")]
    Statut(u16),

    #[error("runtime async: {0}")]
    Runtime(#[from] std::io::Error),
}

#[async_trait]
pub trait SourceIcones: Send + Sync {
    async fn charge(&self) -> Result<CarteIcones, ErreurIcone>;
}

/// Carte distante (document JSON public).
pub struct SourceHttp {
    client: Client,
    url: String,
}

impl SourceHttp {
    pub fn new(url: impl Into<String>, delai: Duration) -> Result<Self, ErreurIcone> {
        let client = Client::builder().timeout(delai).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl SourceIcones for SourceHttp {
    async fn charge(&self) -> Result<CarteIcones, ErreurIcone> {
        debug!(url = %self.url, "chargement de la carte d’icônes");
        let rep = self.client.get(&self.url).send().await?;
        if !rep.status().is_success() {
            return Err(ErreurIcone::Statut(rep.status().as_u16()));
        }
        Ok(rep.json::<CarteIcones>().await?)
    }
}

type Chargement = Shared<BoxFuture<'static, Option<Arc<CarteIcones>>>>;

#[derive(Default)]
struct EtatCache {
    carte: Option<Arc<CarteIcones>>,
    en_vol: Option<Chargement>,
}

pub struct CacheIcones<S> {
    source: Arc<S>,
    etat: Arc<Mutex<EtatCache>>,
}

impl<S: SourceIcones + 'static> CacheIcones<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
            etat: Arc::new(Mutex::new(EtatCache::default())),
        }
    }

    /// Carte mémorisée ; None si le chargement échoue (erreur journalisée).
    /// Tous les appels arrivés pendant un chargement partagent son issue.
    pub async fn carte(&self) -> Option<Arc<CarteIcones>> {
        let vol = {
            let mut etat = self.etat.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(c) = &etat.carte {
                return Some(Arc::clone(c));
            }
            etat.en_vol.get_or_insert_with(|| self.lance()).clone()
        };
        vol.await
    }

    /// Le chargement libère lui-même l’emplacement en vol à sa fin.
    fn lance(&self) -> Chargement {
        let source = Arc::clone(&self.source);
        let etat = Arc::clone(&self.etat);
        async move {
            let res = source.charge().await;
            let mut etat = etat.lock().unwrap_or_else(PoisonError::into_inner);
            etat.en_vol = None;
            match res {
                Ok(c) => {
                    let c = Arc::new(c);
                    etat.carte = Some(Arc::clone(&c));
                    Some(c)
                }
                Err(e) => {
                    warn!(erreur = %e, "carte d’icônes indisponible");
                    None
                }
            }
        }
        .boxed()
        .shared()
    }
}
