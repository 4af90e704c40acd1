// src/app/vue.rs
//
// Vue (UI egui) de la fenêtre “nouvel onglet”
// -------------------------------------------
// - barre de recherche + sélecteur de moteur
// - grille de signets (icônes résolues en tâche de fond, glisser-déposer)
// - calculatrice (pavé basique / scientifique, saisie libre, démarche)
// - réglages, gestionnaire de stockage, export / import
//
// La vue ne décide rien : elle lit l’état et appelle les actions de etat.rs.

use std::time::Duration;

use chrono::Local;
use eframe::egui;

use super::etat::{AppAccueil, Confirmation, FormulaireSignet, Niveau};
use super::liaisons::{action_bouton, PAVE_BASIQUE, PAVE_SCIENTIFIQUE};
use crate::icones::{icone_degradee, Glyphe, Icone};
use crate::moteurs::candidats_icone_moteur;
use crate::noyau::Mode;
use crate::stockage::format_ko;

const TAILLE_ICONE: f32 = 32.0;
const TAILLE_TUILE: [f32; 2] = [88.0, 72.0];

/// Clic dans la grille, appliqué après le parcours (emprunts).
enum ActionTuile {
    Ouvre(String),
    Modifie(usize),
    Supprime(usize),
    Deplace(usize, usize),
}

impl AppAccueil {
    /// UI principale : à appeler depuis eframe::App::update(...)
    pub fn ui(&mut self, ctx: &egui::Context) {
        self.ui_barre_haute(ctx);
        self.ui_message(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.spacing_mut().item_spacing = egui::vec2(6.0, 6.0);
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    self.ui_recherche(ui);
                    ui.add_space(12.0);
                    self.ui_signets(ui);

                    if self.parametres.calculator_widget {
                        ui.add_space(12.0);
                        ui.separator();
                        self.ui_calculatrice(ui);
                    }
                });
        });

        self.ui_formulaire_signet(ctx);
        self.ui_formulaire_moteur(ctx);
        self.ui_parametres(ctx);
        self.ui_gestionnaire(ctx);
        self.ui_offre_gestionnaire(ctx);
        self.ui_confirmation(ctx);
    }

    /* ------------------------ Haut / bas ------------------------ */

    fn ui_barre_haute(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("barre_haute").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.parametres.time_widget {
                    let maintenant = Local::now();
                    ui.heading(maintenant.format("%H:%M:%S").to_string());
                    ui.label(maintenant.format("%A %d %B %Y").to_string());
                    ctx.request_repaint_after(Duration::from_secs(1));
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("⚙").on_hover_text("Réglages").clicked() {
                        self.parametres_ouverts = !self.parametres_ouverts;
                    }
                });
            });
        });
    }

    fn ui_message(&mut self, ctx: &egui::Context) {
        let Some(m) = self.message.clone() else {
            return;
        };
        egui::TopBottomPanel::bottom("message").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let couleur = match m.niveau {
                    Niveau::Info => ui.visuals().text_color(),
                    Niveau::Erreur => ui.visuals().error_fg_color,
                };
                ui.colored_label(couleur, &m.texte);
                if ui.small_button("✕").clicked() {
                    self.message = None;
                }
            });
        });
    }

    /* ------------------------ Recherche ------------------------ */

    fn ui_recherche(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let selection = self.moteurs.selection().to_string();
            let candidats = self.icones_moteur(&selection);
            dessine_premiere_icone(ui, &candidats, 20.0);

            let nom = self.moteurs.nom(&selection).unwrap_or_default();
            let mut choisi = None;
            egui::ComboBox::from_id_salt("moteur")
                .selected_text(nom)
                .show_ui(ui, |ui| {
                    for (cle, nom, _) in self.moteurs.liste() {
                        if ui.selectable_label(cle == selection, nom).clicked() {
                            choisi = Some(cle);
                        }
                    }
                });
            if let Some(c) = choisi {
                self.selectionne_moteur(&c);
            }

            let resp = ui.add(
                egui::TextEdit::singleline(&mut self.recherche)
                    .hint_text("Rechercher ou saisir une adresse")
                    .desired_width(ui.available_width() - 190.0),
            );
            let entree = resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if entree || ui.button("Rechercher").clicked() {
                if let Some(url) = self.soumet_recherche() {
                    ui.ctx().open_url(egui::OpenUrl::new_tab(url));
                }
            }

            if ui.button("+").on_hover_text("Ajouter un moteur").clicked() {
                self.ouvre_ajout_moteur();
            }
            let perso = self.moteurs.perso().contains_key(&selection);
            if ui
                .add_enabled(perso, egui::Button::new("✏"))
                .on_hover_text("Modifier ce moteur")
                .clicked()
            {
                self.ouvre_edition_moteur(&selection);
            }
            if ui
                .add_enabled(perso, egui::Button::new("🗑"))
                .on_hover_text("Supprimer ce moteur")
                .clicked()
            {
                self.confirmation = Some(Confirmation::SupprimeMoteur(selection.clone()));
            }
        });
    }

    /// Perso sans icône saisie : candidats successifs ; sinon l’icône connue.
    fn icones_moteur(&self, cle: &str) -> Vec<Icone> {
        match self.moteurs.perso().get(cle) {
            Some(m) if m.icon.as_deref().is_none_or(|i| i.trim().is_empty()) => {
                candidats_icone_moteur(&m.url)
            }
            _ => vec![self.moteurs.icone(cle), Icone::Glyphe(Glyphe::Recherche)],
        }
    }

    /* ------------------------ Signets ------------------------ */

    fn ui_signets(&mut self, ui: &mut egui::Ui) {
        let signets = self.signets.signets().to_vec();
        let mut action = None;

        ui.horizontal_wrapped(|ui| {
            for (i, s) in signets.iter().enumerate() {
                let icone = self
                    .icones
                    .as_mut()
                    .and_then(|svc| svc.icone(ui.ctx(), &s.url, s.icon.as_deref()))
                    .unwrap_or(Icone::Glyphe(Glyphe::Globe));

                let glisse = ui.dnd_drag_source(egui::Id::new(("signet", i)), i, |ui| {
                    tuile(ui, &icone, &s.name)
                });
                let tuile_resp = glisse.inner.on_hover_text(&s.url);

                if tuile_resp.clicked() {
                    action = Some(ActionTuile::Ouvre(s.url.clone()));
                }
                tuile_resp.context_menu(|ui| {
                    if ui.button("Modifier").clicked() {
                        action = Some(ActionTuile::Modifie(i));
                    }
                    if ui.button("Supprimer").clicked() {
                        action = Some(ActionTuile::Supprime(i));
                    }
                });
                if let Some(de) = glisse.response.dnd_release_payload::<usize>() {
                    action = Some(ActionTuile::Deplace(*de, i));
                }
            }

            if !self.parametres.hide_add_button {
                let r = ui.add_sized(TAILLE_TUILE, egui::Button::new("+\nAjouter"));
                if r.clicked() {
                    self.ouvre_ajout_signet();
                }
            }
        });

        match action {
            Some(ActionTuile::Ouvre(url)) => ui.ctx().open_url(egui::OpenUrl::new_tab(url)),
            Some(ActionTuile::Modifie(i)) => self.ouvre_edition_signet(i),
            Some(ActionTuile::Supprime(i)) => {
                self.confirmation = Some(Confirmation::SupprimeSignet(i));
            }
            Some(ActionTuile::Deplace(de, vers)) => self.deplace_signet(de, vers),
            None => {}
        }
    }

    fn ui_formulaire_signet(&mut self, ctx: &egui::Context) {
        let Some(f) = self.formulaire_signet.as_mut() else {
            return;
        };
        let titre = if f.index.is_some() {
            "Modifier le signet"
        } else {
            "Ajouter un signet"
        };

        let mut valider = false;
        let mut annuler = false;
        egui::Window::new(titre)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                champs_signet(ui, f);
                ui.horizontal(|ui| {
                    valider = ui.button("Enregistrer").clicked();
                    annuler = ui.button("Annuler").clicked();
                });
            });

        if valider {
            self.valide_formulaire_signet();
        } else if annuler {
            self.formulaire_signet = None;
        }
    }

    fn ui_formulaire_moteur(&mut self, ctx: &egui::Context) {
        let Some(f) = self.formulaire_moteur.as_mut() else {
            return;
        };
        let titre = if f.cle.is_some() {
            "Modifier le moteur"
        } else {
            "Ajouter un moteur"
        };

        let mut valider = false;
        let mut annuler = false;
        egui::Window::new(titre)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                egui::Grid::new("champs_moteur").num_columns(2).show(ui, |ui| {
                    ui.label("Nom");
                    ui.text_edit_singleline(&mut f.nom);
                    ui.end_row();
                    ui.label("URL");
                    ui.add(
                        egui::TextEdit::singleline(&mut f.url)
                            .hint_text("https://exemple.org/search?q={searchTerm}"),
                    );
                    ui.end_row();
                    ui.label("Icône");
                    ui.add(egui::TextEdit::singleline(&mut f.icone).hint_text("optionnelle"));
                    ui.end_row();
                });
                if let Some(e) = &f.erreur {
                    ui.colored_label(ui.visuals().error_fg_color, e);
                }
                ui.horizontal(|ui| {
                    valider = ui.button("Enregistrer").clicked();
                    annuler = ui.button("Annuler").clicked();
                });
            });

        if valider {
            self.valide_formulaire_moteur();
        } else if annuler {
            self.formulaire_moteur = None;
        }
    }

    /* ------------------------ Calculatrice ------------------------ */

    fn ui_calculatrice(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Calculatrice");
            let libelle = match self.calc.mode {
                Mode::Basique => "Scientifique",
                Mode::Scientifique => "Basique",
            };
            if ui.button(libelle).clicked() {
                self.bascule_mode_calculatrice();
            }
        });

        // écran : ligne de calcul + résultat
        egui::Frame::group(ui.style())
            .fill(ui.visuals().extreme_bg_color)
            .show(ui, |ui| {
                ui.set_min_width(4.0 * 58.0);
                ui.with_layout(egui::Layout::top_down(egui::Align::Max), |ui| {
                    ui.monospace(self.calc.affichage());
                    ui.heading(&self.calc.dernier_resultat);
                });
            });

        let pave = match self.calc.mode {
            Mode::Basique => PAVE_BASIQUE,
            Mode::Scientifique => PAVE_SCIENTIFIQUE,
        };
        let attente = self.calc.fonction_en_attente().map(|f| f.nom());
        egui::Grid::new("pave_calculatrice")
            .num_columns(4)
            .spacing([6.0, 6.0])
            .show(ui, |ui| {
                for rangee in pave {
                    for &libelle in *rangee {
                        let actif = attente.is_some_and(|n| {
                            n == libelle || (n == "sqrt" && libelle == "√")
                        });
                        let b = egui::Button::new(libelle).selected(actif);
                        if ui.add_sized([52.0, 32.0], b).clicked() {
                            self.action(action_bouton(libelle), libelle);
                        }
                    }
                    ui.end_row();
                }
            });

        ui.add_space(6.0);
        let resp = ui.add(
            egui::TextEdit::singleline(&mut self.saisie_calc)
                .hint_text("Ex: 2(3+4), sin(30), 1.5×10²⁵ / 3")
                .desired_width(4.0 * 58.0)
                .code_editor(),
        );
        if resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            self.evalue_saisie_calc();
            resp.request_focus();
        }

        egui::CollapsingHeader::new("Démarche")
            .default_open(false)
            .show(ui, |ui| {
                let d = &self.calc.demarche;
                ligne_demarche(ui, "Normalisée", &d.normalisee);
                ligne_demarche(ui, "Jetons", &d.jetons);
                ligne_demarche(ui, "RPN", &d.rpn);
            });
    }

    /* ------------------------ Réglages / stockage ------------------------ */

    fn ui_parametres(&mut self, ctx: &egui::Context) {
        if !self.parametres_ouverts {
            return;
        }
        let mut ouvert = true;
        let mut p = self.parametres;
        let mut restaurer = false;
        let mut gestionnaire = false;
        let mut exporter = false;
        let mut importer = false;

        egui::Window::new("Réglages")
            .open(&mut ouvert)
            .resizable(false)
            .show(ctx, |ui| {
                ui.checkbox(&mut p.allow_local_urls, "Autoriser les URL locales");
                ui.checkbox(&mut p.hide_add_button, "Masquer le bouton d’ajout");
                ui.checkbox(&mut p.time_widget, "Horloge (Alt+T)");
                ui.checkbox(&mut p.calculator_widget, "Calculatrice (Alt+L)");
                ui.separator();

                restaurer = ui.button("Restaurer les signets par défaut").clicked();
                gestionnaire = ui.button("Gestionnaire de stockage").clicked();
                ui.separator();

                ui.horizontal(|ui| {
                    ui.label("Dossier d’export");
                    ui.text_edit_singleline(&mut self.dossier_export);
                    exporter = ui.button("Exporter").clicked();
                });
                ui.horizontal(|ui| {
                    ui.label("Fichier à importer");
                    ui.text_edit_singleline(&mut self.chemin_import);
                    importer = ui.button("Importer").clicked();
                });
            });

        self.parametres_ouverts = ouvert;
        self.change_parametres(p);
        if restaurer {
            self.restaure_signets_defaut();
        }
        if gestionnaire {
            self.gestionnaire_ouvert = true;
        }
        if exporter {
            self.exporte();
        }
        if importer {
            self.importe();
        }
    }

    fn ui_gestionnaire(&mut self, ctx: &egui::Context) {
        if !self.gestionnaire_ouvert {
            return;
        }
        let info = self.stockage.info();
        let mut ouvert = true;
        let mut demande = None;

        egui::Window::new("Gestionnaire de stockage")
            .open(&mut ouvert)
            .show(ctx, |ui| {
                ui.label(format!(
                    "Utilisé : {} ({})",
                    info.total_ko(),
                    info.pourcentage_texte()
                ));
                ui.add(egui::ProgressBar::new((info.pourcentage() / 100.0) as f32));
                ui.separator();
                egui::Grid::new("entrees_stockage")
                    .num_columns(3)
                    .striped(true)
                    .show(ui, |ui| {
                        for (cle, taille) in &info.entrees {
                            ui.monospace(cle);
                            ui.label(format_ko(*taille));
                            if ui.small_button("Supprimer").clicked() {
                                demande = Some(Confirmation::SupprimeCle(cle.clone()));
                            }
                            ui.end_row();
                        }
                    });
                ui.separator();
                if ui.button("Tout vider").clicked() {
                    demande = Some(Confirmation::VideStockage);
                }
            });

        self.gestionnaire_ouvert = ouvert;
        if demande.is_some() {
            self.confirmation = demande;
        }
    }

    fn ui_offre_gestionnaire(&mut self, ctx: &egui::Context) {
        let Some(pourcentage) = self.offre_gestionnaire else {
            return;
        };
        let mut reponse = None;
        egui::Window::new("Stockage plein")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!(
                    "Le stockage est plein ({pourcentage:.1}% utilisé).\n\n\
                     Ouvrir le gestionnaire de stockage pour libérer de la place ?"
                ));
                ui.horizontal(|ui| {
                    if ui.button("Ouvrir").clicked() {
                        reponse = Some(true);
                    }
                    if ui.button("Plus tard").clicked() {
                        reponse = Some(false);
                    }
                });
            });
        if let Some(r) = reponse {
            self.repond_offre_gestionnaire(r);
        }
    }

    fn ui_confirmation(&mut self, ctx: &egui::Context) {
        let Some(c) = &self.confirmation else {
            return;
        };
        let texte = match c {
            Confirmation::SupprimeSignet(_) => "Supprimer ce signet ?".to_string(),
            Confirmation::SupprimeMoteur(_) => "Supprimer ce moteur de recherche ?".to_string(),
            Confirmation::SupprimeCle(cle) => format!("Supprimer « {cle} » ?"),
            Confirmation::VideStockage => "Effacer toutes les données ?".to_string(),
        };
        let mut reponse = None;
        egui::Window::new("Confirmation")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(texte);
                ui.horizontal(|ui| {
                    if ui.button("Supprimer").clicked() {
                        reponse = Some(true);
                    }
                    if ui.button("Annuler").clicked() {
                        reponse = Some(false);
                    }
                });
            });
        match reponse {
            Some(true) => self.confirme(),
            Some(false) => self.confirmation = None,
            None => {}
        }
    }
}

/* ------------------------ Helpers de rendu ------------------------ */

fn champs_signet(ui: &mut egui::Ui, f: &mut FormulaireSignet) {
    egui::Grid::new("champs_signet").num_columns(2).show(ui, |ui| {
        ui.label("Nom");
        ui.text_edit_singleline(&mut f.saisie.nom);
        ui.end_row();
        ui.label("URL");
        ui.add(egui::TextEdit::singleline(&mut f.saisie.url).hint_text("https://"));
        ui.end_row();
        ui.label("Icône");
        ui.add(egui::TextEdit::singleline(&mut f.saisie.icone).hint_text("optionnelle"));
        ui.end_row();
    });
    if let Some(e) = &f.erreur {
        ui.colored_label(ui.visuals().error_fg_color, e);
    }
}

fn tuile(ui: &mut egui::Ui, icone: &Icone, nom: &str) -> egui::Response {
    let r = ui.allocate_ui(egui::vec2(TAILLE_TUILE[0], TAILLE_TUILE[1]), |ui| {
        ui.vertical_centered(|ui| {
            dessine_icone(ui, icone, TAILLE_ICONE);
            ui.add(egui::Label::new(nom).truncate());
        });
    });
    r.response.interact(egui::Sense::click())
}

fn ligne_demarche(ui: &mut egui::Ui, titre: &str, contenu: &str) {
    ui.horizontal(|ui| {
        ui.label(format!("{titre} :"));
        ui.monospace(contenu);
    });
}

fn image_glyphe(g: Glyphe) -> egui::Image<'static> {
    egui::Image::from_bytes(g.uri(), g.svg())
}

/// Image distante en échec => glyphe dégradé.
fn dessine_icone(ui: &mut egui::Ui, icone: &Icone, taille: f32) {
    let dim = egui::vec2(taille, taille);
    let image = match icone {
        Icone::Glyphe(g) => image_glyphe(*g),
        Icone::Distante(u) => match ui.ctx().try_load_image(u, egui::SizeHint::default()) {
            Ok(_) => egui::Image::new(u.clone()),
            Err(_) => image_glyphe(icone_degradee()),
        },
    };
    ui.add(image.fit_to_exact_size(dim));
}

/// Premier candidat qui ne soit pas en échec (les chargements en cours comptent).
fn dessine_premiere_icone(ui: &mut egui::Ui, candidats: &[Icone], taille: f32) {
    let choisi = candidats.iter().find(|i| match i {
        Icone::Glyphe(_) => true,
        Icone::Distante(u) => ui
            .ctx()
            .try_load_image(u, egui::SizeHint::default())
            .is_ok(),
    });
    let repli = Icone::Glyphe(Glyphe::Recherche);
    dessine_icone(ui, choisi.unwrap_or(&repli), taille);
}
