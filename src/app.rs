use std::time::Instant;

use eframe::egui::{self, ScrollArea, Ui};

use crate::state::{AppState, CHANGE_POLL_INTERVAL};
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SolarDashApp {
    pub state: AppState,
}

impl SolarDashApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for SolarDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_changes(Instant::now());
        ctx.request_repaint_after(CHANGE_POLL_INTERVAL);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Central panel: both charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if panels::status_placeholder(ui, &self.state.status) {
                return;
            }
            // Specs are rebuilt from the cached series on every frame.
            let Some(charts) = self.state.charts() else {
                return;
            };
            let view = &self.state.view;
            let width = view.content_width(ui.available_width());

            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    ui.vertical_centered(|ui: &mut Ui| {
                        plot::efficiency_plot(ui, &charts.efficiency, view, width);
                        if view.separator {
                            ui.separator();
                        } else {
                            ui.add_space(12.0);
                        }
                        plot::cost_plot(ui, &charts.cost, view, width);
                    });
                });
        });
    }
}
