use eframe::egui::{self, Color32, RichText, Ui};

use crate::config::{Layout, ViewConfig};
use crate::data::source::Format;
use crate::state::{AppState, ReportStatus};

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
            if ui.button("Reload").clicked() {
                state.force_reload();
                ui.close_menu();
            }
        });

        ui.menu_button("View", |ui: &mut Ui| {
            for (layout, label) in [(Layout::Wide, "Wide"), (Layout::Centered, "Centered")] {
                if ui
                    .selectable_label(state.view.layout == layout, label)
                    .clicked()
                {
                    state.view = ViewConfig::from(layout);
                    ui.close_menu();
                }
            }
        });

        ui.separator();

        if let Some(source) = &state.source {
            ui.label(source.to_string());
        }

        if let ReportStatus::Ready(_) = state.status {
            ui.separator();
            ui.label(format!("{} months of year 1", state.month_count()));
        }
    });
}

// ---------------------------------------------------------------------------
// Placeholders for everything but a loaded report
// ---------------------------------------------------------------------------

/// Show the empty/error state. Returns `false` when there is a report to
/// chart instead.
pub fn status_placeholder(ui: &mut Ui, status: &ReportStatus) -> bool {
    let (heading, detail, color) = match status {
        ReportStatus::Ready(_) => return false,
        ReportStatus::Idle => ("Open a sizing report  (File → Open…)", None, None),
        ReportStatus::Unavailable(msg) => (
            "Waiting for the sizing report",
            Some(msg.as_str()),
            Some(Color32::RED),
        ),
        ReportStatus::Invalid(msg) => (
            "This file is not a sizing report",
            Some(msg.as_str()),
            Some(Color32::RED),
        ),
        ReportStatus::NoData => ("The report has no rows for year 1", None, None),
    };

    ui.centered_and_justified(|ui: &mut Ui| {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.heading(heading);
            if let Some(detail) = detail {
                let mut text = RichText::new(detail);
                if let Some(c) = color {
                    text = text.color(c);
                }
                ui.label(text);
            }
        });
    });
    true
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sizing report")
        .add_filter("Supported files", &Format::EXTENSIONS)
        .add_filter("Excel", &["xlsx", "xlsm", "xlsb", "xls"])
        .add_filter("OpenDocument", &["ods"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Opening {}", path.display());
        state.open(path);
    }
}
