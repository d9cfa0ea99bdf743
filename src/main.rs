mod app;
mod color;
mod data;
mod state;
mod ui;

use std::path::Path;

use app::SweetboardApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 840.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sweetboard – Confectionery Sales",
        options,
        Box::new(|_cc| {
            let mut app = SweetboardApp::default();
            // A path on the command line loads a dataset at startup.
            if let Some(arg) = std::env::args().nth(1) {
                ui::panels::load_path(&mut app.state, Path::new(&arg));
            }
            Ok(Box::new(app))
        }),
    )
}
