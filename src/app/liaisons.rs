//! src/app/liaisons.rs
//!
//! Table déclarative {motif -> action} : clavier et pavés de la calculatrice.
//! La vue ne fait que lire les événements egui et appeler `applique`.

use eframe::egui::Key;

use crate::noyau::Calculatrice;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Motif {
    /// un des caractères tapés
    Caracteres(&'static str),
    /// touche nommée, sans modificateur
    Touche(Key),
    /// Alt + touche
    Alt(Key),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    InsereChiffre,
    InsereOperateur,
    Calcule,
    Supprime,
    Efface,
    BasculeCalculatrice,
    BasculeHorloge,
}

impl Action {
    /// Action propre à la calculatrice (ignorée quand elle est masquée).
    pub fn vise_calculatrice(self) -> bool {
        !matches!(self, Action::BasculeCalculatrice | Action::BasculeHorloge)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Liaison {
    pub motif: Motif,
    pub action: Action,
}

pub const LIAISONS_CLAVIER: &[Liaison] = &[
    Liaison {
        motif: Motif::Caracteres("0123456789."),
        action: Action::InsereChiffre,
    },
    Liaison {
        motif: Motif::Caracteres("+-*/()^"),
        action: Action::InsereOperateur,
    },
    Liaison {
        motif: Motif::Touche(Key::Enter),
        action: Action::Calcule,
    },
    Liaison {
        motif: Motif::Touche(Key::Backspace),
        action: Action::Supprime,
    },
    Liaison {
        motif: Motif::Touche(Key::Escape),
        action: Action::Efface,
    },
    Liaison {
        motif: Motif::Alt(Key::L),
        action: Action::BasculeCalculatrice,
    },
    Liaison {
        motif: Motif::Alt(Key::T),
        action: Action::BasculeHorloge,
    },
];

pub fn action_caractere(c: char) -> Option<Action> {
    LIAISONS_CLAVIER.iter().find_map(|l| match l.motif {
        Motif::Caracteres(jeu) if jeu.contains(c) => Some(l.action),
        _ => None,
    })
}

pub fn action_touche(touche: Key, alt: bool) -> Option<Action> {
    LIAISONS_CLAVIER.iter().find_map(|l| match l.motif {
        Motif::Touche(k) if !alt && k == touche => Some(l.action),
        Motif::Alt(k) if alt && k == touche => Some(l.action),
        _ => None,
    })
}

/* ------------------------ Pavés ------------------------ */

pub const PAVE_BASIQUE: &[&[&str]] = &[
    &["C", "DEL", "(", ")"],
    &["7", "8", "9", "÷"],
    &["4", "5", "6", "×"],
    &["1", "2", "3", "-"],
    &["0", ".", "=", "+"],
];

pub const PAVE_SCIENTIFIQUE: &[&[&str]] = &[
    &["sin", "cos", "tan", "√"],
    &["log", "ln", "π", "^"],
    &["C", "DEL", "(", ")"],
    &["7", "8", "9", "÷"],
    &["4", "5", "6", "×"],
    &["1", "2", "3", "-"],
    &["0", ".", "=", "+"],
];

pub fn action_bouton(libelle: &str) -> Action {
    match libelle {
        "=" => Action::Calcule,
        "DEL" => Action::Supprime,
        "C" => Action::Efface,
        l if !l.is_empty() && l.chars().all(|c| c.is_ascii_digit() || c == '.') => {
            Action::InsereChiffre
        }
        _ => Action::InsereOperateur,
    }
}

/// Applique une action calculatrice ; `texte` porte le caractère ou le libellé.
/// Les bascules de widgets sont traitées par l’état de l’app.
pub fn applique(calc: &mut Calculatrice, action: Action, texte: &str) {
    match action {
        Action::InsereChiffre => calc.ajoute_chiffre(texte),
        Action::InsereOperateur => calc.ajoute_operateur(texte),
        Action::Calcule => calc.calcule(),
        Action::Supprime => calc.supprime(),
        Action::Efface => calc.efface(),
        Action::BasculeCalculatrice | Action::BasculeHorloge => {}
    }
}
