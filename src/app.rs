use std::sync::Arc;

use eframe::egui;

use crate::data::export;
use crate::state::AppState;
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SweetboardApp {
    pub state: AppState,
}

impl Default for SweetboardApp {
    fn default() -> Self {
        Self {
            state: AppState::default(),
        }
    }
}

impl eframe::App for SweetboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_screenshots(ctx);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(230.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: KPIs and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            charts::dashboard(ui, &self.state);
        });
    }
}

impl SweetboardApp {
    /// Write the dashboard figure once the requested screenshot frame
    /// arrives.
    fn handle_screenshots(&mut self, ctx: &egui::Context) {
        let images: Vec<Arc<egui::ColorImage>> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|e| match e {
                    egui::Event::Screenshot { image, .. } => Some(image.clone()),
                    _ => None,
                })
                .collect()
        });

        let Some(image) = images.first() else {
            return;
        };
        let Some(path) = self.state.pending_figure.take() else {
            return;
        };

        match export::save_figure(&path, image.size[0], image.size[1], image.as_raw()) {
            Ok(()) => log::info!("Saved dashboard figure to {}", path.display()),
            Err(e) => {
                log::error!("Failed to save figure: {e:#}");
                self.state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
