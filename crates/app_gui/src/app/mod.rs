//! Widget state and frame loop.

use crate::config::Settings;
use eframe::{App, Frame, egui};
use firewatch_core::{
    Outcome, PredictClient, PredictError, Prediction, PredictionRecord, SelectedImage,
    analysis_link, is_image_payload,
};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};

mod detect;
mod history;
mod settings;

const PREVIEW_MAX: u32 = 420;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Panel {
    Detect,
    History,
    Settings,
}

/// Rendered outcome of the most recent submission.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SubmissionResult {
    Detected {
        label: String,
        score: Option<f64>,
        outcome: Outcome,
        /// Absolute link to the server's analysis page, when enabled.
        link: Option<String>,
    },
    /// Application-level rejection or transport failure; no outcome styling.
    Failed { message: String },
}

pub struct UiApp {
    settings: Settings,
    /// Edited copy shown in the settings panel; applied on request.
    pending_settings: Settings,
    client: PredictClient,
    panel: Panel,
    selected: Option<SelectedImage>,
    preview: Option<egui::TextureHandle>,
    busy: bool,
    status: String,
    result: Option<SubmissionResult>,
    history: Vec<PredictionRecord>,
    worker: Option<Receiver<Result<Prediction, PredictError>>>,
    app_version: &'static str,
}

impl UiApp {
    pub fn new(settings: Settings) -> Self {
        let client = PredictClient::new(settings.endpoint_base());
        Self {
            pending_settings: settings.clone(),
            client,
            settings,
            panel: Panel::Detect,
            selected: None,
            preview: None,
            busy: false,
            status: String::new(),
            result: None,
            history: Vec::new(),
            worker: None,
            app_version: env!("FIREWATCH_VERSION"),
        }
    }

    /// Submit is available exactly when an image is selected and nothing is
    /// in flight.
    fn can_submit(&self) -> bool {
        self.selected.is_some() && !self.busy
    }

    fn select_image(&mut self, path: PathBuf, ctx: &egui::Context) {
        match SelectedImage::from_path(&path) {
            Ok(img) => self.apply_selection(img, ctx),
            Err(e) => {
                tracing::warn!("could not read {}: {e:#}", path.display());
                self.status = format!("Could not read {}: {e}", path.display());
            }
        }
    }

    fn apply_selection(&mut self, img: SelectedImage, ctx: &egui::Context) {
        // Preview becomes visible only once the decode has finished.
        self.preview = load_preview(ctx, &img);
        self.selected = Some(img);
        self.result = None;
        self.status.clear();
    }

    fn submit(&mut self, ctx: &egui::Context) {
        // No-op without a selection; the button is inert in that case anyway.
        let Some(image) = self.selected.clone() else {
            return;
        };
        self.result = None;
        self.status.clear();
        self.busy = true;

        let (tx, rx) = mpsc::channel();
        self.worker = Some(rx);
        let client = self.client.clone();
        let repaint = ctx.clone();
        std::thread::spawn(move || {
            let outcome = client.predict(&image);
            // Receiver may be gone if the app shut down mid-flight.
            let _ = tx.send(outcome);
            repaint.request_repaint();
        });
    }

    fn poll_worker(&mut self) {
        let Some(rx) = &self.worker else { return };
        match rx.try_recv() {
            Ok(res) => {
                self.worker = None;
                self.busy = false;
                self.apply_result(res);
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                tracing::error!("submission worker vanished without a result");
                self.worker = None;
                self.busy = false;
                self.result = Some(SubmissionResult::Failed {
                    message: "Request failed: worker terminated unexpectedly".to_string(),
                });
            }
        }
    }

    fn apply_result(&mut self, res: Result<Prediction, PredictError>) {
        match res {
            Ok(Prediction::Detected { label, score, image }) => {
                let outcome = Outcome::from_label(&label);
                let link = if self.settings.show_detail_link {
                    image
                        .as_deref()
                        .map(|p| format!("{}{}", self.settings.endpoint_base(), analysis_link(p)))
                } else {
                    None
                };
                let file = self
                    .selected
                    .as_ref()
                    .map(|s| s.file_name.clone())
                    .unwrap_or_default();
                self.history.push(PredictionRecord {
                    file,
                    label: label.clone(),
                    score,
                    outcome,
                    time: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
                });
                self.result = Some(SubmissionResult::Detected {
                    label,
                    score,
                    outcome,
                    link,
                });
            }
            Ok(Prediction::Rejected { message }) => {
                self.result = Some(SubmissionResult::Failed {
                    message: format!("Error: {message}"),
                });
            }
            Err(e) => {
                self.result = Some(SubmissionResult::Failed {
                    message: format!("Request failed: {e}"),
                });
            }
        }
    }

    fn handle_drops(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if dropped.is_empty() {
            return;
        }
        if self.busy {
            tracing::debug!("drop ignored while a submission is in flight");
            return;
        }
        for file in dropped {
            if !is_image_payload(&file.mime, file.path.as_deref()) {
                tracing::debug!(name = %file.name, mime = %file.mime, "non-image drop ignored");
                continue;
            }
            match (file.path, file.bytes) {
                (Some(path), _) => self.select_image(path, ctx),
                (None, Some(bytes)) => {
                    let img = SelectedImage::from_parts(file.name, file.mime, bytes.to_vec());
                    self.apply_selection(img, ctx);
                }
                (None, None) => {}
            }
        }
    }
}

fn load_preview(ctx: &egui::Context, img: &SelectedImage) -> Option<egui::TextureHandle> {
    match image::load_from_memory(&img.bytes) {
        Ok(decoded) => {
            let thumb = decoded.thumbnail(PREVIEW_MAX, PREVIEW_MAX).to_rgba8();
            let (w, h) = thumb.dimensions();
            let size = [w as usize, h as usize];
            let pixels = thumb.into_raw();
            let color = egui::ColorImage::from_rgba_unmultiplied(size, &pixels);
            let name = format!("preview:{}", img.file_name);
            Some(ctx.load_texture(name, color, egui::TextureOptions::LINEAR))
        }
        Err(e) => {
            tracing::warn!("failed to decode preview for {}: {}", img.file_name, e);
            None
        }
    }
}

impl App for UiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.poll_worker();
        self.handle_drops(ctx);

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("FireWatch");
                ui.separator();
                ui.selectable_value(&mut self.panel, Panel::Detect, "Detect");
                ui.selectable_value(&mut self.panel, Panel::History, "History");
                ui.selectable_value(&mut self.panel, Panel::Settings, "Settings");
                if !self.status.is_empty() {
                    ui.separator();
                    ui.label(&self.status);
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.panel {
            Panel::Detect => self.render_detect_panel(ui),
            Panel::History => self.render_history_panel(ui),
            Panel::Settings => self.render_settings_panel(ui),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn app() -> UiApp {
        UiApp::new(Settings::default())
    }

    fn with_selection(app: &mut UiApp) {
        app.selected = Some(SelectedImage::from_parts(
            "a.jpg",
            "image/jpeg",
            vec![0xff, 0xd8],
        ));
    }

    #[test]
    fn submit_enabled_iff_selected_and_idle() {
        let mut app = app();
        assert!(!app.can_submit());

        with_selection(&mut app);
        assert!(app.can_submit());

        app.busy = true;
        assert!(!app.can_submit());
    }

    #[test]
    fn submit_without_selection_is_a_noop() {
        let mut app = app();
        let ctx = egui::Context::default();
        app.submit(&ctx);
        assert!(!app.busy);
        assert!(app.worker.is_none());
    }

    #[test]
    fn detection_builds_styled_result_and_link() {
        let mut app = app();
        with_selection(&mut app);
        app.apply_result(Ok(Prediction::Detected {
            label: "Fire Detected".to_string(),
            score: Some(0.873),
            image: Some("static/uploads/a.jpg".to_string()),
        }));

        match app.result.as_ref().unwrap() {
            SubmissionResult::Detected {
                label,
                score,
                outcome,
                link,
            } => {
                assert_eq!(label, "Fire Detected");
                assert_eq!(*score, Some(0.873));
                assert_eq!(*outcome, Outcome::Fire);
                assert_eq!(
                    link.as_deref(),
                    Some("http://127.0.0.1:5000/analysis/a.jpg")
                );
            }
            other => panic!("expected detection, got {other:?}"),
        }
        assert_eq!(app.history.len(), 1);
        assert_eq!(app.history[0].file, "a.jpg");
        // Selection is never cleared automatically, so a resubmission of the
        // same image stays possible.
        assert!(app.can_submit());
    }

    #[rstest]
    #[case("static/uploads/a.jpg", "http://127.0.0.1:5000/analysis/a.jpg")]
    #[case("x/y\\b.jpg", "http://127.0.0.1:5000/analysis/b.jpg")]
    fn detections_link_to_analysis_page(#[case] image: &str, #[case] expected: &str) {
        let mut app = app();
        with_selection(&mut app);
        app.apply_result(Ok(Prediction::Detected {
            label: "No Fire".to_string(),
            score: None,
            image: Some(image.to_string()),
        }));

        match app.result.as_ref().unwrap() {
            SubmissionResult::Detected { link, .. } => {
                assert_eq!(link.as_deref(), Some(expected));
            }
            other => panic!("expected detection, got {other:?}"),
        }
    }

    #[test]
    fn detail_link_can_be_disabled() {
        let mut app = UiApp::new(Settings {
            show_detail_link: false,
            ..Settings::default()
        });
        with_selection(&mut app);
        app.apply_result(Ok(Prediction::Detected {
            label: "Fire Detected".to_string(),
            score: Some(0.4),
            image: Some("static/uploads/a.jpg".to_string()),
        }));

        match app.result.as_ref().unwrap() {
            SubmissionResult::Detected { link, .. } => assert!(link.is_none()),
            other => panic!("expected detection, got {other:?}"),
        }
    }

    #[test]
    fn rejection_renders_error_message_without_styling() {
        let mut app = app();
        with_selection(&mut app);
        app.apply_result(Ok(Prediction::Rejected {
            message: "bad image".to_string(),
        }));

        assert_eq!(
            app.result,
            Some(SubmissionResult::Failed {
                message: "Error: bad image".to_string()
            })
        );
        assert!(app.history.is_empty());
    }

    #[test]
    fn finished_worker_clears_busy_and_reports_failure() {
        let mut app = app();
        with_selection(&mut app);
        app.busy = true;
        let (tx, rx) = mpsc::channel();
        app.worker = Some(rx);
        tx.send(Err(firewatch_core::parse_prediction("<html>").unwrap_err()))
            .unwrap();

        app.poll_worker();

        assert!(!app.busy);
        assert!(app.can_submit());
        match app.result.as_ref().unwrap() {
            SubmissionResult::Failed { message } => {
                assert!(message.starts_with("Request failed:"), "got {message}");
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn pending_worker_leaves_busy_set() {
        let mut app = app();
        with_selection(&mut app);
        app.busy = true;
        let (_tx, rx) = mpsc::channel::<Result<Prediction, PredictError>>();
        app.worker = Some(rx);

        app.poll_worker();

        assert!(app.busy);
        assert!(!app.can_submit());
    }
}
