use eframe::egui;

use crate::client::{Navigation, Route};
use crate::egui_app::state::AppState;
use crate::egui_app::theme::{colors, styles};

pub mod auth_view;
pub mod dashboard_view;
pub mod event_form_view;

pub fn render_top_bar(ctx: &egui::Context, state: &mut AppState) {
    let frame_style = egui::Frame::default()
        .fill(colors::TOP_BAR_BG)
        .inner_margin(egui::Margin::symmetric(12, 8));

    egui::TopBottomPanel::top("top_panel")
        .frame(frame_style)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.colored_label(
                    colors::TEXT_LIGHT,
                    egui::RichText::new("📅 Eventboard").size(18.0).strong(),
                );

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.add_space(16.0);

                    let Some(user) = state.current_user().cloned() else {
                        return;
                    };

                    if ui.button("Logout").clicked() {
                        state.logout();
                    }
                    ui.add_space(8.0);
                    ui.colored_label(colors::ICONS, format!("({})", user.role));
                    ui.colored_label(colors::TEXT_LIGHT, user.name);
                });
            });
        });
}

pub fn render_main_panel(ctx: &egui::Context, state: &mut AppState) {
    let navigation = state.navigation();

    egui::CentralPanel::default()
        .frame(styles::content_frame())
        .show(ctx, |ui| match navigation {
            Navigation::Placeholder => render_placeholder(ui),
            Navigation::Render(route) | Navigation::Redirect(route) => match route {
                Route::Login => auth_view::render(ui, state, false),
                Route::Register => auth_view::render(ui, state, true),
                Route::Dashboard => dashboard_view::render(ui, state),
                Route::NewEvent | Route::EditEvent(_) => event_form_view::render(ui, state),
            },
        });
}

fn render_placeholder(ui: &mut egui::Ui) {
    ui.vertical_centered(|ui| {
        ui.add_space(ui.available_height() / 2.0 - 20.0);
        ui.spinner();
        ui.colored_label(colors::TEXT_SECONDARY, "Loading...");
    });
}

/// Error line shared by the views
pub(crate) fn render_error(ui: &mut egui::Ui, state: &AppState) {
    if let Some(ref error) = state.error {
        ui.label(egui::RichText::new(error).color(colors::ERROR));
        ui.add_space(10.0);
    }
}
