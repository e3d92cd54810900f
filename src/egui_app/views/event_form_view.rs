use eframe::egui;

use crate::client::Route;
use crate::egui_app::forms::DATE_FORMAT;
use crate::egui_app::state::AppState;
use crate::egui_app::theme::{colors, styles};

const LABEL_WIDTH: f32 = 140.0;
const INPUT_WIDTH: f32 = 360.0;

fn row(ui: &mut egui::Ui, label: &str, add_input: impl FnOnce(&mut egui::Ui)) {
    ui.horizontal(|ui| {
        ui.add_sized(
            [LABEL_WIDTH, 24.0],
            egui::Label::new(egui::RichText::new(label).color(colors::TEXT_SECONDARY)),
        );
        add_input(ui);
    });
    ui.add_space(8.0);
}

/// Create form when the route is `/events/new`, edit form otherwise
pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    let editing = state.event_form.is_editing();

    ui.colored_label(
        colors::TEXT_LIGHT,
        egui::RichText::new(if editing { "Edit event" } else { "New event" })
            .size(22.0)
            .strong(),
    );
    ui.add_space(16.0);

    super::render_error(ui, state);

    let form = &mut state.event_form;
    row(ui, "Title", |ui| {
        ui.add_sized([INPUT_WIDTH, 28.0], egui::TextEdit::singleline(&mut form.title));
    });
    row(ui, "Description", |ui| {
        ui.add_sized(
            [INPUT_WIDTH, 80.0],
            egui::TextEdit::multiline(&mut form.description),
        );
    });
    row(ui, "Date (UTC)", |ui| {
        ui.add_sized(
            [INPUT_WIDTH, 28.0],
            egui::TextEdit::singleline(&mut form.date).hint_text(DATE_FORMAT),
        );
    });
    row(ui, "Location", |ui| {
        ui.add_sized(
            [INPUT_WIDTH, 28.0],
            egui::TextEdit::singleline(&mut form.location).hint_text("optional"),
        );
    });
    row(ui, "Required workers", |ui| {
        ui.add_sized(
            [80.0, 28.0],
            egui::TextEdit::singleline(&mut form.required_workers),
        );
    });

    ui.add_space(12.0);

    let mut save = false;
    let mut cancel = false;
    ui.horizontal(|ui| {
        ui.add_space(LABEL_WIDTH);
        let label = if editing { "Save changes" } else { "Create event" };
        save = ui
            .add_enabled(!state.busy, styles::button(label, colors::BUTTON_PRIMARY))
            .clicked();
        cancel = ui.button("Cancel").clicked();
        if state.busy {
            ui.spinner();
        }
    });

    if save {
        state.submit_event_form();
    } else if cancel {
        state.go_to(Route::Dashboard);
    }
}
