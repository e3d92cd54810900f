use eframe::egui;
use uuid::Uuid;

use crate::egui_app::forms::format_date;
use crate::egui_app::state::AppState;
use crate::egui_app::theme::{colors, styles};
use crate::shared::{Event, RegistrationAction, User};

/// Click collected while the list is borrowed
enum Action {
    Refresh,
    NewEvent,
    Edit(Event),
    AskDelete(Uuid),
    Register(Uuid),
    Unregister(Uuid),
}

pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    let Some(user) = state.current_user().cloned() else {
        return;
    };
    let mut action = None;

    ui.horizontal(|ui| {
        ui.colored_label(
            colors::TEXT_LIGHT,
            egui::RichText::new("Upcoming events").size(22.0).strong(),
        );
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if user.is_admin()
                && ui
                    .add(styles::button("➕ New event", colors::BUTTON_PRIMARY))
                    .clicked()
            {
                action = Some(Action::NewEvent);
            }
            if ui.add_enabled(!state.loading_events, egui::Button::new("🔄 Refresh")).clicked() {
                action = Some(Action::Refresh);
            }
            if state.loading_events || state.busy {
                ui.spinner();
            }
        });
    });
    ui.add_space(12.0);

    super::render_error(ui, state);

    if state.events.is_empty() && !state.loading_events {
        ui.colored_label(colors::TEXT_SECONDARY, "No events scheduled yet.");
    }

    egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
        for event in &state.events {
            if let Some(clicked) = render_event(ui, event, &user, state.busy) {
                action = Some(clicked);
            }
            ui.add_space(8.0);
        }
    });

    render_delete_confirmation(ui.ctx(), state);

    match action {
        Some(Action::Refresh) => state.refresh_events(),
        Some(Action::NewEvent) => state.open_new_event(),
        Some(Action::Edit(event)) => state.open_edit_event(&event),
        Some(Action::AskDelete(id)) => state.confirm_delete = Some(id),
        Some(Action::Register(id)) => state.register_for_event(id),
        Some(Action::Unregister(id)) => state.unregister_from_event(id),
        None => {}
    }
}

fn render_event(ui: &mut egui::Ui, event: &Event, user: &User, busy: bool) -> Option<Action> {
    let mut action = None;

    styles::card_frame().show(ui, |ui| {
        ui.set_width(ui.available_width());

        ui.horizontal(|ui| {
            ui.colored_label(
                colors::TEXT_DARK,
                egui::RichText::new(&event.title).size(18.0).strong(),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let filled = event.registered_users.len();
                let color = if event.is_full() { colors::WARNING } else { colors::SUCCESS };
                ui.colored_label(color, format!("{} / {} workers", filled, event.required_workers));
            });
        });

        let mut when = format!("🕑 {} UTC", format_date(&event.date));
        if let Some(location) = &event.location {
            when.push_str(&format!("   📍 {}", location));
        }
        ui.colored_label(colors::TEXT_SECONDARY, when);

        if !event.description.is_empty() {
            ui.add_space(4.0);
            ui.colored_label(colors::TEXT_DARK, &event.description);
        }
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            match event.registration_action(user.id) {
                RegistrationAction::Unregister => {
                    let button = styles::button("Unregister", colors::BUTTON_SECONDARY);
                    if ui.add_enabled(!busy, button).clicked() {
                        action = Some(Action::Unregister(event.id));
                    }
                    ui.colored_label(colors::SUCCESS, "You are registered");
                }
                RegistrationAction::Register { enabled } => {
                    let button = styles::button("Register", colors::BUTTON_PRIMARY);
                    let response = ui.add_enabled(enabled && !busy, button);
                    if response.clicked() {
                        action = Some(Action::Register(event.id));
                    }
                    if !enabled {
                        ui.colored_label(colors::WARNING, "Event is full");
                    }
                }
            }

            if user.is_admin() {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .add_enabled(!busy, styles::button("Delete", colors::BUTTON_DANGER))
                        .clicked()
                    {
                        action = Some(Action::AskDelete(event.id));
                    }
                    if ui.add_enabled(!busy, egui::Button::new("Edit")).clicked() {
                        action = Some(Action::Edit(event.clone()));
                    }
                });
            }
        });
    });

    action
}

fn render_delete_confirmation(ctx: &egui::Context, state: &mut AppState) {
    let Some(id) = state.confirm_delete else {
        return;
    };
    let title = state
        .events
        .iter()
        .find(|event| event.id == id)
        .map(|event| event.title.clone())
        .unwrap_or_default();

    let mut confirmed = false;
    let mut cancelled = false;

    egui::Window::new("Delete event")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.colored_label(colors::TEXT_DARK, format!("Delete \"{}\" and its roster?", title));
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                confirmed = ui.add(styles::button("Delete", colors::BUTTON_DANGER)).clicked();
                cancelled = ui.button("Cancel").clicked();
            });
        });

    if confirmed {
        state.delete_event(id);
    } else if cancelled {
        state.confirm_delete = None;
    }
}
