// src/main.rs
//
// Onglet d’accueil — point d’entrée natif
// ---------------------------------------
// - journalisation : RUST_LOG, sinon warn (info pour ce crate)
// - configuration  : variables ONGLET_* (voir config.rs)
// - chargeurs d’images egui (http + svg + png/ico) avant la première frame

use eframe::egui;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod icones;
mod moteurs;
mod noyau;
mod signets;
mod stockage;
mod validation;

use app::AppAccueil;
use config::Config;

const TITRE_APP: &str = "Nouvel onglet";

fn init_journal() {
    let filtre = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,onglet_accueil=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filtre)
        .with_target(false)
        .init();
}

fn main() -> eframe::Result<()> {
    init_journal();

    let config = Config::depuis_env();
    info!(donnees = %config.chemin_donnees.display(), "démarrage");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(TITRE_APP)
            .with_inner_size([960.0, 720.0])
            .with_min_inner_size([520.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        TITRE_APP,
        options,
        Box::new(move |cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            let app = AppAccueil::new(&config).map_err(|e| {
                error!(erreur = %e, "démarrage impossible");
                Box::new(e) as Box<dyn std::error::Error + Send + Sync>
            })?;
            Ok(Box::new(app))
        }),
    )
}
