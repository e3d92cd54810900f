/**
 * Eventboard Desktop Client - Main Entry Point
 *
 * Implements eframe::App: each frame applies finished background work,
 * then renders the navbar and the page the router guard allows.
 */
use eframe::egui;
use eventboard::egui_app::{theme::styles, views, AppState, Config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    let config = Config::load()?;
    let state = AppState::new(config)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 720.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Eventboard",
        options,
        Box::new(|cc| {
            styles::apply_global_theme(&cc.egui_ctx);
            Ok(Box::new(EventboardApp { state }))
        }),
    )?;

    Ok(())
}

struct EventboardApp {
    state: AppState,
}

impl eframe::App for EventboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll();

        views::render_top_bar(ctx, &mut self.state);

        views::render_main_panel(ctx, &mut self.state);

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}

impl Drop for EventboardApp {
    fn drop(&mut self) {
        self.state.shutdown();
    }
}
