// src/app.rs
//
// Onglet d’accueil — module App (racine)
// -------------------------------------
// Rôle:
// - Déclarer les sous-modules (état, vue, liaisons clavier, pont icônes)
// - Ré-exporter AppAccueil (pour main.rs)
// - Fournir l’impl eframe::App : clavier global via la table de liaisons, puis la vue
//
// Le clavier global ne s’applique que si aucun champ texte n’a le focus
// (sinon Enter/Backspace appartiennent au champ).

pub mod etat;
pub mod icones;
pub mod liaisons;
pub mod vue;

pub use etat::AppAccueil;

use eframe::egui;

use liaisons::{action_caractere, action_touche};

impl AppAccueil {
    fn clavier_global(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let evenements = ctx.input(|i| i.events.clone());
        for e in evenements {
            match e {
                egui::Event::Text(t) => {
                    if !self.parametres.calculator_widget {
                        continue;
                    }
                    for c in t.chars() {
                        if let Some(a) = action_caractere(c) {
                            self.action(a, c.encode_utf8(&mut [0; 4]));
                        }
                    }
                }
                egui::Event::Key {
                    key,
                    pressed: true,
                    modifiers,
                    ..
                } => {
                    if let Some(a) = action_touche(key, modifiers.alt) {
                        if !a.vise_calculatrice() || self.parametres.calculator_widget {
                            self.action(a, "");
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

impl eframe::App for AppAccueil {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.clavier_global(ctx);
        self.ui(ctx);
    }
}
