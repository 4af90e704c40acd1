//! src/noyau/calculatrice.rs
//!
//! Machine à états de la calculatrice (sans vue).
//!
//! États : Inactif <-> EnAttente(fonction, argument)
//! - touches en Inactif      : tampon d’expression
//! - touche fonction          : EnAttente, argument vidé
//! - touches en EnAttente    : tampon d’argument (l’expression ne bouge pas)
//! - "=" en EnAttente         : f(argument) -> résultat + expression, retour Inactif
//! - "=" en Inactif           : évalue l’expression
//! - C                        : tout remis à zéro
//! - DEL                      : dernier caractère du tampon actif ("**" d’un coup)
//!
//! Contrat : l’argument n’existe que dans EnAttente (porté par l’enum),
//! donc le remettre à zéro efface les deux d’un coup.

use tracing::{debug, warn};

use super::erreur::ErreurCalcul;
use super::eval::{eval_detaille, Demarche};
use super::format::{format_nombre, parse_nombre_formate};

/// Résultat affiché au démarrage (et après C).
pub const RESULTAT_INITIAL: &str = "0";

/// Jeton affiché quand l’évaluation échoue.
pub const JETON_ERREUR: &str = "Erreur";

/// Opérateur puissance dans le tampon (supprimé d’un seul coup).
const OPERATEUR_PUISSANCE: &str = "**";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fonction {
    Sin,
    Cos,
    Tan,
    Racine,
    Log,
    Ln,
}

impl Fonction {
    /// Nom utilisé pour l’affichage et la normalisation.
    pub fn nom(self) -> &'static str {
        match self {
            Fonction::Sin => "sin",
            Fonction::Cos => "cos",
            Fonction::Tan => "tan",
            Fonction::Racine => "sqrt",
            Fonction::Log => "log",
            Fonction::Ln => "ln",
        }
    }

    pub fn depuis_touche(touche: &str) -> Option<Self> {
        match touche {
            "sin" => Some(Fonction::Sin),
            "cos" => Some(Fonction::Cos),
            "tan" => Some(Fonction::Tan),
            "√" | "sqrt" => Some(Fonction::Racine),
            "log" => Some(Fonction::Log),
            "ln" => Some(Fonction::Ln),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum EtatFonction {
    #[default]
    Inactif,
    EnAttente {
        fonction: Fonction,
        argument: String,
    },
}

/// Disposition du pavé (n’affecte pas l’évaluation).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Basique,
    Scientifique,
}

impl Mode {
    /// Valeur stockée sous `calculatorMode`.
    pub fn cle(self) -> &'static str {
        match self {
            Mode::Basique => "basic",
            Mode::Scientifique => "scientific",
        }
    }

    pub fn depuis_cle(cle: &str) -> Self {
        if cle == "scientific" {
            Mode::Scientifique
        } else {
            Mode::Basique
        }
    }

    pub fn bascule(self) -> Self {
        match self {
            Mode::Basique => Mode::Scientifique,
            Mode::Scientifique => Mode::Basique,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Calculatrice {
    pub expression: String,
    pub etat: EtatFonction,

    /// Résultat affiché ("0", "14", "1.5×10²⁵", "Erreur").
    pub dernier_resultat: String,

    /// Graine de continuation : dernier résultat valide.
    derniere_reponse: String,

    /// Démarche de la dernière évaluation réussie.
    pub demarche: Demarche,

    pub mode: Mode,
}

impl Default for Calculatrice {
    fn default() -> Self {
        Self {
            expression: String::new(),
            etat: EtatFonction::Inactif,
            dernier_resultat: RESULTAT_INITIAL.to_string(),
            derniere_reponse: RESULTAT_INITIAL.to_string(),
            demarche: Demarche::default(),
            mode: Mode::Basique,
        }
    }
}

impl Calculatrice {
    pub fn avec_mode(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /* ------------------------ Touches ------------------------ */

    /// Chiffre (ou '.') : va dans le tampon actif.
    pub fn ajoute_chiffre(&mut self, chiffre: &str) {
        self.tampon_actif().push_str(chiffre);
    }

    /// Opérateur, π ou touche fonction.
    pub fn ajoute_operateur(&mut self, touche: &str) {
        // Nouvelle chaîne : on repart du dernier résultat
        if self.expression.is_empty() && self.derniere_reponse != RESULTAT_INITIAL {
            self.expression = parse_nombre_formate(&self.derniere_reponse);
        }

        if let Some(fonction) = Fonction::depuis_touche(touche) {
            self.etat = EtatFonction::EnAttente {
                fonction,
                argument: String::new(),
            };
            return;
        }

        let texte = match touche {
            "×" => "*",
            "÷" => "/",
            "^" => OPERATEUR_PUISSANCE,
            autre => autre,
        };
        self.tampon_actif().push_str(texte);
    }

    /// "=" : fonction en attente, sinon expression complète.
    pub fn calcule(&mut self) {
        match std::mem::take(&mut self.etat) {
            EtatFonction::EnAttente { fonction, argument } => {
                if argument.is_empty() {
                    // rien à appliquer : on annule simplement la fonction
                    return;
                }
                let texte = format!("{}({argument})", fonction.nom());
                self.evalue(&texte);
            }
            EtatFonction::Inactif => {
                let texte = self.expression.clone();
                self.evalue(&texte);
            }
        }
    }

    /// Saisie libre (Enter). Vrai si l’évaluation a réussi.
    pub fn evalue_texte(&mut self, texte: &str) -> bool {
        self.etat = EtatFonction::Inactif;
        self.evalue(texte)
    }

    /// C : tout remis à zéro.
    pub fn efface(&mut self) {
        self.expression.clear();
        self.etat = EtatFonction::Inactif;
        self.dernier_resultat = RESULTAT_INITIAL.to_string();
        self.derniere_reponse = RESULTAT_INITIAL.to_string();
        self.demarche = Demarche::default();
    }

    /// DEL : un caractère du tampon actif, "**" d’un coup.
    pub fn supprime(&mut self) {
        match &mut self.etat {
            EtatFonction::EnAttente { argument, .. } => {
                argument.pop();
            }
            EtatFonction::Inactif => {
                if self.expression.ends_with(OPERATEUR_PUISSANCE) {
                    let n = self.expression.len() - OPERATEUR_PUISSANCE.len();
                    self.expression.truncate(n);
                } else {
                    self.expression.pop();
                }
            }
        }
    }

    pub fn bascule_mode(&mut self) {
        self.mode = self.mode.bascule();
    }

    /* ------------------------ Lecture ------------------------ */

    /// Ligne de calcul : "sin(30)" si une fonction attend, sinon l’expression.
    pub fn affichage(&self) -> String {
        match &self.etat {
            EtatFonction::EnAttente { fonction, argument } => {
                format!("{}({argument})", fonction.nom())
            }
            EtatFonction::Inactif => self.expression.clone(),
        }
    }

    pub fn fonction_en_attente(&self) -> Option<Fonction> {
        match &self.etat {
            EtatFonction::EnAttente { fonction, .. } => Some(*fonction),
            EtatFonction::Inactif => None,
        }
    }

    /* ------------------------ Interne ------------------------ */

    fn tampon_actif(&mut self) -> &mut String {
        match &mut self.etat {
            EtatFonction::EnAttente { argument, .. } => argument,
            EtatFonction::Inactif => &mut self.expression,
        }
    }

    fn evalue(&mut self, texte: &str) -> bool {
        match eval_detaille(texte) {
            Ok((v, demarche)) => {
                self.depose(v, demarche);
                true
            }
            Err(e) => {
                self.signale(texte, &e);
                false
            }
        }
    }

    fn depose(&mut self, v: f64, demarche: Demarche) {
        let s = format_nombre(v);
        debug!(resultat = %s, "calcul terminé");
        self.dernier_resultat = s.clone();
        self.derniere_reponse = s.clone();
        self.expression = s;
        self.demarche = demarche;
    }

    fn signale(&mut self, texte: &str, e: &ErreurCalcul) {
        warn!(expression = texte, erreur = %e, "erreur de calcul");
        self.dernier_resultat = JETON_ERREUR.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tape(c: &mut Calculatrice, touches: &[&str]) {
        for t in touches {
            match *t {
                "=" => c.calcule(),
                "DEL" => c.supprime(),
                "C" => c.efface(),
                t if t.chars().all(|ch| ch.is_ascii_digit() || ch == '.') => c.ajoute_chiffre(t),
                t => c.ajoute_operateur(t),
            }
        }
    }

    #[test]
    fn racine_de_neuf() {
        let mut c = Calculatrice::default();
        tape(&mut c, &["√", "9", "="]);
        assert_eq!(c.dernier_resultat, "3");
        assert_eq!(c.expression, "3");
        assert_eq!(c.etat, EtatFonction::Inactif);
    }

    #[test]
    fn sinus_en_degres_et_en_radians() {
        let mut c = Calculatrice::default();
        tape(&mut c, &["sin", "30", "="]);
        let v: f64 = c.dernier_resultat.parse().unwrap();
        assert!((v - 0.5).abs() < 1e-12);

        let mut c = Calculatrice::default();
        tape(&mut c, &["sin", "π", "÷", "6", "="]);
        let v: f64 = c.dernier_resultat.parse().unwrap();
        assert!((v - 0.5).abs() < 1e-12);
    }

    #[test]
    fn touches_en_attente_ne_touchent_pas_l_expression() {
        let mut c = Calculatrice::default();
        tape(&mut c, &["2", "+"]);
        tape(&mut c, &["cos", "6", "0"]);
        assert_eq!(c.expression, "2+");
        assert_eq!(c.affichage(), "cos(60)");
        assert_eq!(c.fonction_en_attente(), Some(Fonction::Cos));
    }

    #[test]
    fn egal_sur_expression() {
        let mut c = Calculatrice::default();
        tape(&mut c, &["6", "×", "7", "="]);
        assert_eq!(c.dernier_resultat, "42");
        assert_eq!(c.expression, "42");
    }

    #[test]
    fn continuation_depuis_le_dernier_resultat() {
        let mut c = Calculatrice::default();
        tape(&mut c, &["6", "×", "7", "="]);
        c.expression.clear();
        tape(&mut c, &["+", "1", "="]);
        assert_eq!(c.dernier_resultat, "43");
    }

    #[test]
    fn pas_de_continuation_depuis_zero_initial() {
        let mut c = Calculatrice::default();
        tape(&mut c, &["-", "5", "="]);
        assert_eq!(c.dernier_resultat, "-5");
    }

    #[test]
    fn continuation_relit_la_notation_scientifique() {
        let mut c = Calculatrice::default();
        assert!(c.evalue_texte("1e25"));
        assert_eq!(c.dernier_resultat, "1×10²⁵");
        c.expression.clear();
        tape(&mut c, &["×", "2", "="]);
        assert_eq!(c.dernier_resultat, "2×10²⁵");
    }

    #[test]
    fn suppression_de_la_puissance_d_un_coup() {
        let mut c = Calculatrice::default();
        tape(&mut c, &["2", "^"]);
        assert_eq!(c.expression, "2**");
        c.supprime();
        assert_eq!(c.expression, "2");
        c.supprime();
        assert_eq!(c.expression, "");
    }

    #[test]
    fn suppression_dans_l_argument() {
        let mut c = Calculatrice::default();
        tape(&mut c, &["7", "sin", "4", "5", "DEL"]);
        assert_eq!(c.affichage(), "sin(4)");
        assert_eq!(c.expression, "7");
    }

    #[test]
    fn effacement_total() {
        let mut c = Calculatrice::default();
        tape(&mut c, &["9", "=", "ln", "2", "C"]);
        assert_eq!(c.expression, "");
        assert_eq!(c.dernier_resultat, RESULTAT_INITIAL);
        assert_eq!(c.etat, EtatFonction::Inactif);
        // après C, pas de continuation
        tape(&mut c, &["-", "1", "="]);
        assert_eq!(c.dernier_resultat, "-1");
    }

    #[test]
    fn erreur_affichee_puis_effacable() {
        let mut c = Calculatrice::default();
        tape(&mut c, &["1", "÷", "0", "="]);
        assert_eq!(c.dernier_resultat, JETON_ERREUR);
        c.efface();
        assert_eq!(c.dernier_resultat, RESULTAT_INITIAL);
    }

    #[test]
    fn argument_vide_annule_la_fonction() {
        let mut c = Calculatrice::default();
        tape(&mut c, &["log", "="]);
        assert_eq!(c.etat, EtatFonction::Inactif);
        assert_eq!(c.dernier_resultat, RESULTAT_INITIAL);
    }

    #[test]
    fn saisie_libre() {
        let mut c = Calculatrice::default();
        assert!(c.evalue_texte("log(1000) + 2(3)"));
        let v: f64 = c.dernier_resultat.parse().unwrap();
        assert!((v - 9.0).abs() < 1e-12);
        assert!(!c.evalue_texte("2+*"));
        assert_eq!(c.dernier_resultat, JETON_ERREUR);
    }

    #[test]
    fn mode_bascule_et_cle() {
        let mut c = Calculatrice::avec_mode(Mode::depuis_cle("scientific"));
        assert_eq!(c.mode, Mode::Scientifique);
        c.bascule_mode();
        assert_eq!(c.mode.cle(), "basic");
    }
}
