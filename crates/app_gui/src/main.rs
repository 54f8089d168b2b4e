use eframe::{NativeOptions, egui};

mod app;
mod config;

use app::UiApp;
use config::Settings;

fn main() {
    tracing_subscriber::fmt::init();
    let settings = Settings::load();
    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([560.0, 680.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    if let Err(e) = eframe::run_native(
        "FireWatch",
        options,
        Box::new(move |_cc| {
            Ok::<_, Box<dyn std::error::Error + Send + Sync>>(Box::new(UiApp::new(settings)))
        }),
    ) {
        eprintln!("Application exited with error: {e}");
    }
}
