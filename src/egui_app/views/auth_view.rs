use eframe::egui;

use crate::client::Route;
use crate::egui_app::state::AppState;
use crate::egui_app::theme::colors;

const INPUT_WIDTH: f32 = 280.0;
const LABEL_WIDTH: f32 = 80.0;

fn field(ui: &mut egui::Ui, offset: f32, label: &str, value: &mut String, password: bool) {
    ui.horizontal(|ui| {
        ui.add_space(offset);
        ui.add_sized(
            [LABEL_WIDTH, 24.0],
            egui::Label::new(egui::RichText::new(label).color(colors::TEXT_SECONDARY)),
        );
        ui.add_sized(
            [INPUT_WIDTH, 28.0],
            egui::TextEdit::singleline(value)
                .password(password)
                .text_color(colors::TEXT_DARK),
        );
    });
    ui.add_space(8.0);
}

/// Login form, or the registration form when `signup` is set
pub fn render(ui: &mut egui::Ui, state: &mut AppState, signup: bool) {
    let available_rect = ui.available_rect_before_wrap();

    ui.scope_builder(egui::UiBuilder::new().max_rect(available_rect), |ui| {
        ui.vertical_centered(|ui| {
            let total_height = if signup { 400.0 } else { 280.0 };
            let top_space = (available_rect.height() - total_height).max(0.0) / 2.0;
            ui.add_space(top_space);

            ui.label(
                egui::RichText::new(if signup { "Create Account" } else { "Welcome Back" })
                    .size(24.0)
                    .color(colors::TEXT_LIGHT),
            );
            ui.add_space(20.0);

            super::render_error(ui, state);

            let offset =
                ((available_rect.width() - INPUT_WIDTH - LABEL_WIDTH - 20.0) / 2.0).max(0.0);
            let mut submitted = false;

            if signup {
                let form = &mut state.register_form;
                field(ui, offset, "Name:", &mut form.name, false);
                field(ui, offset, "Email:", &mut form.email, false);
                field(ui, offset, "Password:", &mut form.password, true);
                field(ui, offset, "Confirm:", &mut form.confirm_password, true);
                ui.horizontal(|ui| {
                    ui.add_space(offset + LABEL_WIDTH);
                    ui.checkbox(
                        &mut form.admin,
                        egui::RichText::new("Register as admin").color(colors::TEXT_SECONDARY),
                    );
                });
            } else {
                let form = &mut state.login_form;
                field(ui, offset, "Email:", &mut form.email, false);
                field(ui, offset, "Password:", &mut form.password, true);
                submitted = ui.input(|i| i.key_pressed(egui::Key::Enter));
            }

            ui.add_space(20.0);

            ui.horizontal(|ui| {
                let button_width = 120.0;
                let total_buttons_width = button_width * 2.0 + 10.0;
                ui.add_space(((available_rect.width() - total_buttons_width) / 2.0).max(0.0));

                let primary = egui::Button::new(
                    egui::RichText::new(if signup { "Sign Up" } else { "Login" })
                        .color(colors::TEXT_LIGHT),
                )
                .fill(colors::BUTTON_PRIMARY);

                if ui
                    .add_enabled_ui(!state.busy, |ui| ui.add_sized([button_width, 32.0], primary))
                    .inner
                    .clicked()
                {
                    submitted = true;
                }

                ui.add_space(10.0);

                let switch = egui::Button::new(
                    egui::RichText::new(if signup { "Back to Login" } else { "Create Account" })
                        .color(colors::TEXT_DARK),
                )
                .fill(colors::BUTTON_SECONDARY);
                if ui.add_sized([button_width, 32.0], switch).clicked() {
                    state.go_to(if signup { Route::Login } else { Route::Register });
                }
            });

            if submitted && !state.busy {
                if signup {
                    state.handle_register();
                } else {
                    state.handle_login();
                }
            }

            if state.busy {
                ui.add_space(15.0);
                ui.horizontal(|ui| {
                    ui.add_space(((available_rect.width() - 100.0) / 2.0).max(0.0));
                    ui.label(egui::RichText::new("Loading...").color(colors::TEXT_LIGHT));
                    ui.spinner();
                });
            }
        });
    });
}
