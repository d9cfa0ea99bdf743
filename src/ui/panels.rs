use std::collections::BTreeSet;
use std::path::Path;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::aggregate::{self, GroupField};
use crate::data::{export, loader};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone what we need so we can mutate the selection inside the loop.
    let regions: Vec<String> = dataset.regions.iter().cloned().collect();
    let products: Vec<String> = dataset.products.iter().cloned().collect();
    let cleaning_summary = dataset.report.to_string();

    let Some(selection) = state.selection.as_mut() else {
        return;
    };

    let mut reset = false;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            category_filter(ui, "Region", &regions, &mut selection.regions);
            category_filter(ui, "Product", &products, &mut selection.products);

            ui.separator();
            ui.strong("Date range");
            ui.horizontal(|ui: &mut Ui| {
                ui.label("From");
                ui.add(DatePickerButton::new(&mut selection.date_from).id_salt("date_from"));
            });
            ui.horizontal(|ui: &mut Ui| {
                ui.label("To");
                ui.add(DatePickerButton::new(&mut selection.date_to).id_salt("date_to"));
            });

            ui.add_space(6.0);
            if ui.button("Reset filters").clicked() {
                reset = true;
            }

            ui.separator();
            ui.label(RichText::new(cleaning_summary).small().weak());
        });

    if reset {
        state.reset_selection();
    }
    // Recompute visible indices after any widget changes.
    state.refilter();
}

/// One collapsible multi-select over a category universe.
fn category_filter(ui: &mut Ui, label: &str, universe: &[String], selected: &mut BTreeSet<String>) {
    let header_text = format!("{label}  ({}/{})", selected.len(), universe.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(label)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    selected.extend(universe.iter().cloned());
                }
                if ui.small_button("None").clicked() {
                    selected.clear();
                }
            });

            for value in universe {
                let mut checked = selected.contains(value);
                if ui.checkbox(&mut checked, value).changed() {
                    if checked {
                        selected.insert(value.clone());
                    } else {
                        selected.remove(value);
                    }
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }

            ui.menu_button("Export", |ui: &mut Ui| {
                if ui.button("Region summary (CSV)").clicked() {
                    export_aggregate(state, "regional_summary", &[GroupField::Region]);
                    ui.close_menu();
                }
                if ui.button("Product summary (CSV)").clicked() {
                    export_aggregate(state, "product_summary", &[GroupField::Product]);
                    ui.close_menu();
                }
                if ui.button("Region × product (CSV)").clicked() {
                    export_aggregate(
                        state,
                        "region_product_matrix",
                        &[GroupField::Region, GroupField::Product],
                    );
                    ui.close_menu();
                }
                if ui.button("Monthly units (CSV)").clicked() {
                    export_aggregate(
                        state,
                        "monthly_units",
                        &[GroupField::Month, GroupField::Region],
                    );
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Dashboard figure (PNG)").clicked() {
                    request_figure(ui, state);
                    ui.close_menu();
                }
            });
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} transactions loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sales data")
        .add_filter("Supported files", &["csv", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        load_path(state, &path);
    }
}

/// Load a dataset into the session state, surfacing failures in the status
/// line instead of aborting.
pub fn load_path(state: &mut AppState, path: &Path) {
    state.loading = true;
    match loader::load_file(path) {
        Ok(dataset) => {
            log::info!(
                "Loaded {} transactions across {} regions, {} products",
                dataset.len(),
                dataset.regions.len(),
                dataset.products.len()
            );
            state.set_dataset(dataset);
        }
        Err(e) => {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
            state.loading = false;
        }
    }
}

/// Export one aggregate table over the currently visible rows.
fn export_aggregate(state: &mut AppState, name: &str, fields: &[GroupField]) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export aggregate table")
        .set_file_name(format!("{name}.csv"))
        .add_filter("CSV", &["csv"])
        .save_file()
    else {
        return;
    };

    let rows = aggregate::aggregate(state.visible_rows(), fields);
    match export::write_aggregate_file(&path, fields, &rows) {
        Ok(()) => log::info!("Exported {} groups to {}", rows.len(), path.display()),
        Err(e) => {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

/// Ask for a save path, then request a screenshot of the dashboard; the app
/// writes the PNG when the frame arrives.
fn request_figure(ui: &Ui, state: &mut AppState) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save dashboard figure")
        .set_file_name("dashboard.png")
        .add_filter("PNG", &["png"])
        .save_file()
    else {
        return;
    };

    state.pending_figure = Some(path);
    ui.ctx()
        .send_viewport_cmd(egui::ViewportCommand::Screenshot(Default::default()));
}
