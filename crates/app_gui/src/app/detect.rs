//! Upload area, preview, and result rendering.

use super::{SubmissionResult, UiApp};
use eframe::egui;
use firewatch_core::{Outcome, fire_probability, format_score};
use rfd::FileDialog;

const FIRE_COLOR: egui::Color32 = egui::Color32::from_rgb(222, 89, 49);
const CLEAR_COLOR: egui::Color32 = egui::Color32::from_rgb(92, 168, 98);

impl UiApp {
    pub(super) fn render_detect_panel(&mut self, ui: &mut egui::Ui) {
        let hovering = ui.ctx().input(|i| !i.raw.hovered_files.is_empty());
        let stroke = if hovering {
            egui::Stroke::new(2.0, ui.visuals().selection.stroke.color)
        } else {
            egui::Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color)
        };

        egui::Frame::group(ui.style())
            .stroke(stroke)
            .inner_margin(egui::Margin::same(16))
            .show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label("Drag an image here, or");
                    if ui
                        .add_enabled(!self.busy, egui::Button::new("Choose image..."))
                        .clicked()
                        && let Some(path) = FileDialog::new()
                            .add_filter("Images", &["jpg", "jpeg", "png", "gif", "bmp", "webp"])
                            .pick_file()
                    {
                        let ctx = ui.ctx().clone();
                        self.select_image(path, &ctx);
                    }
                });
            });

        ui.add_space(8.0);
        if let Some(img) = &self.selected {
            if let Some(tex) = &self.preview {
                ui.image((tex.id(), tex.size_vec2()));
            }
            ui.label(egui::RichText::new(&img.file_name).weak());
        }

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui
                .add_enabled(self.can_submit(), egui::Button::new("Detect fire"))
                .clicked()
            {
                let ctx = ui.ctx().clone();
                self.submit(&ctx);
            }
            if self.busy {
                ui.spinner();
                ui.label("Analyzing image...");
            }
        });

        ui.add_space(8.0);
        match self.result.clone() {
            Some(SubmissionResult::Detected {
                label,
                score,
                outcome,
                link,
            }) => {
                ui.heading(egui::RichText::new(&label).color(outcome_color(outcome)));
                if let Some(score) = score {
                    ui.label(format!(
                        "score: {} (fire probability {:.2}%)",
                        format_score(score),
                        fire_probability(score)
                    ));
                }
                if let Some(link) = link {
                    ui.horizontal(|ui| {
                        ui.hyperlink_to("View analysis", &link);
                        if ui.button("Copy link").clicked() {
                            self.copy_to_clipboard(&link);
                        }
                    });
                }
            }
            Some(SubmissionResult::Failed { message }) => {
                ui.colored_label(ui.visuals().error_fg_color, &message);
            }
            None => {}
        }
    }

    fn copy_to_clipboard(&mut self, text: &str) {
        match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text.to_string())) {
            Ok(()) => self.status = "Link copied.".to_string(),
            Err(e) => {
                tracing::warn!("clipboard error: {e}");
                self.status = format!("Clipboard error: {e}");
            }
        }
    }
}

fn outcome_color(outcome: Outcome) -> egui::Color32 {
    match outcome {
        Outcome::Fire => FIRE_COLOR,
        Outcome::Other => CLEAR_COLOR,
    }
}
