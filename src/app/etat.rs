//! src/app/etat.rs
//!
//! État de la fenêtre “nouvel onglet” (sans rendu).
//!
//! Rôle : posséder toutes les instances (calculatrice, signets, moteurs,
//! stockage, service d’icônes) et offrir les actions de la vue.
//! Toute action qui modifie une donnée persistée l’écrit aussitôt.
//!
//! Contrats :
//! - quota dépassé => proposition d’ouvrir le gestionnaire de stockage
//! - autre échec d’écriture => message d’erreur, l’état mémoire reste modifié
//! - service d’icônes indisponible => glyphes seulement (journalisé)

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use super::icones::ServiceIcones;
use super::liaisons::{applique, Action};
use crate::config::Config;
use crate::moteurs::{cible_recherche, Moteurs};
use crate::noyau::Calculatrice;
use crate::signets::{ListeSignets, SaisieSignet};
use crate::stockage::sauvegarde::{exporte_vers, importe_depuis};
use crate::stockage::{cles, ErreurStockage, Parametres, Stockage};

#[derive(Debug, Error)]
pub enum ErreurDemarrage {
    #[error("stockage: {0}")]
    Stockage(#[from] ErreurStockage),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Niveau {
    Info,
    Erreur,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub texte: String,
    pub niveau: Niveau,
}

/// Formulaire signet : `index` = None pour un ajout.
#[derive(Clone, Debug, Default)]
pub struct FormulaireSignet {
    pub index: Option<usize>,
    pub saisie: SaisieSignet,
    pub erreur: Option<String>,
}

/// Formulaire moteur : `cle` = None pour un ajout.
#[derive(Clone, Debug, Default)]
pub struct FormulaireMoteur {
    pub cle: Option<String>,
    pub nom: String,
    pub url: String,
    pub icone: String,
    pub erreur: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Confirmation {
    SupprimeSignet(usize),
    SupprimeMoteur(String),
    SupprimeCle(String),
    VideStockage,
}

pub struct AppAccueil {
    pub calc: Calculatrice,
    pub saisie_calc: String,

    pub signets: ListeSignets,
    pub moteurs: Moteurs,
    pub recherche: String,
    pub parametres: Parametres,

    pub stockage: Stockage,
    pub icones: Option<ServiceIcones>,

    // --- fenêtres / dialogues ---
    pub formulaire_signet: Option<FormulaireSignet>,
    pub formulaire_moteur: Option<FormulaireMoteur>,
    pub confirmation: Option<Confirmation>,
    pub parametres_ouverts: bool,
    pub gestionnaire_ouvert: bool,
    /// quota dépassé : pourcentage utilisé, en attente de réponse
    pub offre_gestionnaire: Option<f64>,

    pub message: Option<Message>,
    pub chemin_import: String,
    pub dossier_export: String,
}

impl AppAccueil {
    pub fn new(config: &Config) -> Result<Self, ErreurDemarrage> {
        let stockage = Stockage::ouvre(&config.chemin_donnees)?;
        let icones = match ServiceIcones::new(config) {
            Ok(s) => Some(s),
            Err(e) => {
                warn!(erreur = %e, "service d’icônes indisponible, glyphes seulement");
                None
            }
        };
        Ok(Self::avec_stockage(stockage, icones))
    }

    pub fn avec_stockage(stockage: Stockage, icones: Option<ServiceIcones>) -> Self {
        let dossier_export = stockage
            .chemin()
            .and_then(|c| c.parent())
            .map(|d| d.display().to_string())
            .unwrap_or_else(|| ".".to_string());

        let mut app = Self {
            calc: Calculatrice::default(),
            saisie_calc: String::new(),
            signets: ListeSignets::default(),
            moteurs: Moteurs::default(),
            recherche: String::new(),
            parametres: Parametres::default(),
            stockage,
            icones,
            formulaire_signet: None,
            formulaire_moteur: None,
            confirmation: None,
            parametres_ouverts: false,
            gestionnaire_ouvert: false,
            offre_gestionnaire: None,
            message: None,
            chemin_import: String::new(),
            dossier_export,
        };
        app.recharge();

        if app.stockage.lit_brut(cles::DEJA_VISITE).is_none() {
            info!("première visite");
            app.persiste_brut(cles::DEJA_VISITE, "true".to_string());
        }
        app
    }

    /// Relit tout depuis le stockage (démarrage, import, vidage).
    pub fn recharge(&mut self) {
        self.parametres = self.stockage.parametres();
        self.calc = Calculatrice::avec_mode(self.stockage.mode_calculatrice());
        self.moteurs = Moteurs::new(
            self.stockage.moteurs_perso(),
            self.stockage.dernier_moteur().as_deref(),
        );
        self.signets = ListeSignets::new(
            self.stockage.signets(),
            self.stockage.defauts_supprimes(),
        );
        if self.signets.ajoute_defauts_manquants() {
            self.persiste_signets();
        }
    }

    /* ------------------------ Persistance ------------------------ */

    fn traite_erreur(&mut self, cle: &str, e: ErreurStockage) {
        match e {
            ErreurStockage::QuotaDepasse { pourcentage } => {
                self.offre_gestionnaire = Some(pourcentage);
            }
            autre => {
                error!(cle, erreur = %autre, "écriture stockage");
                self.signale_erreur(format!("Échec de l’enregistrement : {autre}"));
            }
        }
    }

    fn persiste<T: Serialize + ?Sized>(&mut self, cle: &str, valeur: &T) -> bool {
        match self.stockage.ecrit(cle, valeur) {
            Ok(()) => true,
            Err(e) => {
                self.traite_erreur(cle, e);
                false
            }
        }
    }

    fn persiste_brut(&mut self, cle: &str, valeur: String) -> bool {
        match self.stockage.ecrit_brut(cle, valeur) {
            Ok(()) => true,
            Err(e) => {
                self.traite_erreur(cle, e);
                false
            }
        }
    }

    fn persiste_signets(&mut self) -> bool {
        let signets = self.signets.signets().to_vec();
        let supprimes = self.signets.defauts_supprimes().to_vec();
        self.persiste(cles::SIGNETS, &signets) && self.persiste(cles::DEFAUTS_SUPPRIMES, &supprimes)
    }

    fn persiste_moteurs(&mut self) -> bool {
        let perso = self.moteurs.perso().clone();
        let selection = self.moteurs.selection().to_string();
        self.persiste(cles::MOTEURS_PERSO, &perso)
            && self.persiste_brut(cles::DERNIER_MOTEUR, selection)
    }

    pub fn signale(&mut self, texte: impl Into<String>) {
        self.message = Some(Message {
            texte: texte.into(),
            niveau: Niveau::Info,
        });
    }

    pub fn signale_erreur(&mut self, texte: impl Into<String>) {
        self.message = Some(Message {
            texte: texte.into(),
            niveau: Niveau::Erreur,
        });
    }

    /* ------------------------ Recherche ------------------------ */

    /// URL à ouvrir (navigation ou recherche) ; None si saisie vide.
    pub fn soumet_recherche(&mut self) -> Option<String> {
        let cible = cible_recherche(&self.recherche, &self.moteurs)?;
        info!(url = cible.url(), "ouverture");
        Some(cible.url().to_string())
    }

    pub fn selectionne_moteur(&mut self, cle: &str) {
        if self.moteurs.selectionne(cle) {
            self.persiste_brut(cles::DERNIER_MOTEUR, cle.to_string());
        }
    }

    pub fn ouvre_ajout_moteur(&mut self) {
        self.formulaire_moteur = Some(FormulaireMoteur::default());
    }

    pub fn ouvre_edition_moteur(&mut self, cle: &str) {
        if let Some(m) = self.moteurs.perso().get(cle) {
            self.formulaire_moteur = Some(FormulaireMoteur {
                cle: Some(cle.to_string()),
                nom: m.name.clone(),
                url: m.url.clone(),
                icone: m.icon.clone().unwrap_or_default(),
                erreur: None,
            });
        }
    }

    pub fn valide_formulaire_moteur(&mut self) {
        let Some(mut f) = self.formulaire_moteur.take() else {
            return;
        };
        let r = match &f.cle {
            Some(cle) => self.moteurs.modifie(cle, &f.nom, &f.url, &f.icone),
            None => self.moteurs.ajoute(&f.nom, &f.url, &f.icone).map(|_| ()),
        };
        match r {
            Ok(()) => {
                self.persiste_moteurs();
            }
            Err(e) => {
                f.erreur = Some(e.to_string());
                self.formulaire_moteur = Some(f);
            }
        }
    }

    pub fn supprime_moteur(&mut self, cle: &str) {
        if self.moteurs.supprime(cle).is_some() {
            self.persiste_moteurs();
        }
    }

    /* ------------------------ Signets ------------------------ */

    pub fn ouvre_ajout_signet(&mut self) {
        self.formulaire_signet = Some(FormulaireSignet::default());
    }

    pub fn ouvre_edition_signet(&mut self, index: usize) {
        if let Some(s) = self.signets.signets().get(index) {
            self.formulaire_signet = Some(FormulaireSignet {
                index: Some(index),
                saisie: SaisieSignet::depuis(s),
                erreur: None,
            });
        }
    }

    pub fn valide_formulaire_signet(&mut self) {
        let Some(mut f) = self.formulaire_signet.take() else {
            return;
        };
        let locales = self.parametres.allow_local_urls;
        let r = match f.index {
            Some(i) => self.signets.modifie(i, &f.saisie, locales),
            None => self.signets.ajoute(&f.saisie, locales),
        };
        match r {
            Ok(()) => {
                self.persiste_signets();
            }
            Err(e) => {
                f.erreur = Some(e.to_string());
                self.formulaire_signet = Some(f);
            }
        }
    }

    pub fn supprime_signet(&mut self, index: usize) {
        if self.signets.supprime(index).is_some() {
            self.persiste_signets();
        }
    }

    pub fn deplace_signet(&mut self, de: usize, vers: usize) {
        if self.signets.deplace(de, vers) {
            self.persiste_signets();
        }
    }

    pub fn restaure_signets_defaut(&mut self) {
        self.signets.restaure_defauts();
        if let Err(e) = self.stockage.supprime(cles::DEFAUTS_SUPPRIMES) {
            self.traite_erreur(cles::DEFAUTS_SUPPRIMES, e);
        }
        let signets = self.signets.signets().to_vec();
        self.persiste(cles::SIGNETS, &signets);
    }

    /* ------------------------ Calculatrice ------------------------ */

    pub fn bascule_mode_calculatrice(&mut self) {
        self.calc.bascule_mode();
        self.persiste_brut(cles::MODE_CALCULATRICE, self.calc.mode.cle().to_string());
    }

    /// Enter dans le champ libre.
    pub fn evalue_saisie_calc(&mut self) {
        let texte = std::mem::take(&mut self.saisie_calc);
        if !self.calc.evalue_texte(&texte) {
            // on rend la saisie pour correction
            self.saisie_calc = texte;
        }
    }

    /// Action issue des liaisons clavier ou d’un bouton du pavé.
    pub fn action(&mut self, action: Action, texte: &str) {
        match action {
            Action::BasculeCalculatrice => {
                let mut p = self.parametres;
                p.calculator_widget = !p.calculator_widget;
                self.change_parametres(p);
            }
            Action::BasculeHorloge => {
                let mut p = self.parametres;
                p.time_widget = !p.time_widget;
                self.change_parametres(p);
            }
            a => applique(&mut self.calc, a, texte),
        }
    }

    /* ------------------------ Réglages / stockage ------------------------ */

    pub fn change_parametres(&mut self, p: Parametres) {
        if p == self.parametres {
            return;
        }
        self.parametres = p;
        if let Err(e) = self.stockage.ecrit_parametres(&p) {
            self.traite_erreur("settings", e);
        }
    }

    /// Réponse à la proposition “stockage plein”.
    pub fn repond_offre_gestionnaire(&mut self, ouvrir: bool) {
        self.offre_gestionnaire = None;
        self.gestionnaire_ouvert = ouvrir;
    }

    pub fn supprime_cle_stockage(&mut self, cle: &str) {
        match self.stockage.supprime(cle) {
            Ok(()) => {
                self.recharge();
                self.signale(format!("« {cle} » supprimé"));
            }
            Err(e) => self.traite_erreur(cle, e),
        }
    }

    pub fn vide_stockage(&mut self) {
        match self.stockage.vide_tout() {
            Ok(()) => {
                self.recharge();
                self.signale("Stockage vidé");
            }
            Err(e) => self.traite_erreur("*", e),
        }
    }

    /// Confirmation acceptée : exécute l’action retenue.
    pub fn confirme(&mut self) {
        match self.confirmation.take() {
            Some(Confirmation::SupprimeSignet(i)) => self.supprime_signet(i),
            Some(Confirmation::SupprimeMoteur(c)) => self.supprime_moteur(&c),
            Some(Confirmation::SupprimeCle(c)) => self.supprime_cle_stockage(&c),
            Some(Confirmation::VideStockage) => self.vide_stockage(),
            None => {}
        }
    }

    pub fn exporte(&mut self) {
        let dossier = PathBuf::from(self.dossier_export.trim());
        match exporte_vers(&self.stockage, &dossier) {
            Ok(chemin) => self.signale(format!("Sauvegarde : {}", chemin.display())),
            Err(e) => {
                error!(erreur = %e, "export");
                self.signale_erreur(format!("Échec de l’export : {e}"));
            }
        }
    }

    /// Import puis rechargement complet de l’état.
    pub fn importe(&mut self) {
        let chemin = PathBuf::from(self.chemin_import.trim());
        match importe_depuis(&mut self.stockage, &chemin) {
            Ok(cles) => {
                self.recharge();
                self.signale(format!("Import terminé ({} entrées)", cles.len()));
            }
            Err(ErreurStockage::QuotaDepasse { pourcentage }) => {
                self.recharge();
                self.offre_gestionnaire = Some(pourcentage);
            }
            Err(e) => {
                error!(erreur = %e, "import");
                self.signale_erreur(
                    "Échec de l’import. Vérifiez que le fichier est une sauvegarde valide.",
                );
            }
        }
    }
}
