//! Settings panel rendering for the endpoint and widget options.

use super::{Panel, UiApp};
use eframe::egui;
use firewatch_core::PredictClient;

impl UiApp {
    /// Renders the settings screen; edits take effect on "Apply".
    pub(super) fn render_settings_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Settings");
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            ui.label("Detection service URL");
            ui.text_edit_singleline(&mut self.pending_settings.endpoint);
        });
        ui.add_space(6.0);
        ui.checkbox(
            &mut self.pending_settings.show_detail_link,
            "Link detections to the server's analysis page",
        );

        ui.add_space(12.0);
        if ui.button("Apply").clicked() {
            self.settings = self.pending_settings.clone();
            self.client = PredictClient::new(self.settings.endpoint_base());
            match self.settings.save() {
                Ok(()) => self.status = "Settings saved.".to_string(),
                Err(e) => {
                    tracing::warn!("could not save settings: {e:#}");
                    self.status = format!("Settings applied, but not saved: {e}");
                }
            }
            self.panel = Panel::Detect;
        }

        ui.add_space(16.0);
        ui.separator();
        ui.add_space(6.0);
        ui.heading("Versions");
        ui.label(format!("App version: {}", self.app_version));
    }
}
