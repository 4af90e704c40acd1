//! Noyau calculatrice (f64)
//!
//! Organisation interne :
//! - normalise.rs    : notation humaine -> forme canonique (π, ×, ÷, ^, √, 2(…), degrés)
//! - jetons.rs       : tokenisation de la forme canonique
//! - rpn.rs          : shunting-yard + évaluation RPN
//! - eval.rs         : pipeline complet + garde-fous (fini, zéro numérique)
//! - format.rs       : affichage 1.5×10²⁵ et relecture
//! - calculatrice.rs : machine à états des touches (fonction en attente, continuation)
//! - erreur.rs       : erreurs d’évaluation

pub mod calculatrice;
pub mod erreur;
pub mod eval;
pub mod format;
pub mod jetons;
pub mod normalise;
pub mod rpn;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_fuzz_safe;

// API publique minimale
pub use calculatrice::{Calculatrice, Mode};
#[cfg(test)]
pub use eval::eval_expression;
