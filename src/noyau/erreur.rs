// src/noyau/erreur.rs

use thiserror::Error;

/// Erreurs d’évaluation (affichées “Erreur” côté calculatrice).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErreurCalcul {
    #[error("Entrée vide")]
    EntreeVide,

    #[error("caractère inattendu: '{0}'")]
    CaractereInattendu(char),

    #[error("nombre invalide: {0}")]
    NombreInvalide(String),

    #[error("référence inconnue: {0}")]
    ReferenceInconnue(String),

    #[error("parenthèses non fermées")]
    ParentheseOuverte,

    #[error("parenthèse fermante sans ouvrante")]
    ParentheseFermante,

    #[error("expression invalide")]
    ExpressionInvalide,

    #[error("résultat non fini")]
    NonFini,
}
