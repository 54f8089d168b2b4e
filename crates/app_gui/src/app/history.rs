//! Session history table and CSV export.

use super::UiApp;
use eframe::egui;
use egui_extras::{Column, TableBuilder};
use firewatch_core::{export_csv, format_score};
use rfd::FileDialog;

impl UiApp {
    pub(super) fn render_history_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Session history");
        ui.add_space(8.0);

        let can_export = !self.history.is_empty();
        if ui
            .add_enabled(can_export, egui::Button::new("Export CSV"))
            .clicked()
            && let Some(path) = FileDialog::new()
                .add_filter("CSV", &["csv"])
                .set_file_name("firewatch_history.csv")
                .save_file()
        {
            if let Err(e) = export_csv(&self.history, &path) {
                self.status = format!("Export failed: {e}");
            } else {
                self.status = format!("CSV exported: {}", path.display());
            }
        }

        ui.add_space(8.0);
        if self.history.is_empty() {
            ui.label("No submissions yet.");
            return;
        }

        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto())
            .column(Column::auto())
            .column(Column::remainder())
            .column(Column::auto())
            .column(Column::auto())
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Time");
                });
                header.col(|ui| {
                    ui.strong("File");
                });
                header.col(|ui| {
                    ui.strong("Label");
                });
                header.col(|ui| {
                    ui.strong("Score");
                });
                header.col(|ui| {
                    ui.strong("Outcome");
                });
            })
            .body(|mut body| {
                for rec in &self.history {
                    body.row(18.0, |mut row| {
                        row.col(|ui| {
                            ui.label(&rec.time);
                        });
                        row.col(|ui| {
                            ui.label(&rec.file);
                        });
                        row.col(|ui| {
                            ui.label(&rec.label);
                        });
                        row.col(|ui| {
                            ui.label(rec.score.map(format_score).unwrap_or_default());
                        });
                        row.col(|ui| {
                            ui.label(rec.outcome.as_str());
                        });
                    });
                }
            });
    }
}
