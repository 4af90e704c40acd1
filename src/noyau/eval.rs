//! Noyau — évaluation (pipeline réel)
//!
//! normalise -> jetons -> RPN -> valeur f64 -> garde-fous (fini, zéro numérique)
//!
//! Deux entrées partagent ce pipeline : la touche "=" de la calculatrice et
//! la saisie libre (Enter). Même normalisation, même règle degrés/radians.

use tracing::debug;

use super::erreur::ErreurCalcul;
use super::jetons::{format_tokens, tokenize};
use super::normalise::normalise;
use super::rpn::{eval_rpn, to_rpn};

/// En dessous, le résultat est ramené à 0 exactement (sin(180) ≈ 1.2e-16).
pub const SEUIL_ZERO: f64 = 1e-10;

#[derive(Default, Clone, Debug)]
pub struct Demarche {
    pub normalisee: String,
    pub jetons: String,
    pub rpn: String,
}

/// |x| < 1e-10 => 0.
pub fn arrondit_zero(x: f64) -> f64 {
    if x.abs() < SEUIL_ZERO {
        0.0
    } else {
        x
    }
}

/// API publique : évalue une expression et retourne la valeur + la démarche.
pub fn eval_detaille(expr_str: &str) -> Result<(f64, Demarche), ErreurCalcul> {
    let s = expr_str.trim();
    if s.is_empty() {
        return Err(ErreurCalcul::EntreeVide);
    }

    // 1) Forme canonique
    let normalisee = normalise(s);
    debug!(brut = s, normalisee = %normalisee, "expression normalisée");

    // 2) Jetons
    let jetons = tokenize(&normalisee)?;
    let jetons_txt = format_tokens(&jetons);

    // 3) RPN
    let rpn = to_rpn(&jetons)?;
    let rpn_txt = format_tokens(&rpn);

    // 4) Valeur
    let v = eval_rpn(&rpn)?;
    if !v.is_finite() {
        return Err(ErreurCalcul::NonFini);
    }

    let d = Demarche {
        normalisee,
        jetons: jetons_txt,
        rpn: rpn_txt,
    };

    Ok((arrondit_zero(v), d))
}

/// Raccourci sans démarche.
#[cfg(test)]
pub fn eval_expression(expr_str: &str) -> Result<f64, ErreurCalcul> {
    eval_detaille(expr_str).map(|(v, _)| v)
}
