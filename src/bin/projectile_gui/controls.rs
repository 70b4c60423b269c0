use macroquad::prelude::*;
use macroquad::ui::{hash, root_ui, widgets};

use projectile_analyzer::core::command::MenuAction;

use crate::constants::{PANEL_HEIGHT, PANEL_WIDTH, PANEL_X, PANEL_Y};
use crate::state::AppRuntime;

pub(crate) fn hotkey_action() -> Option<MenuAction> {
    if is_key_pressed(KeyCode::Escape) {
        Some(MenuAction::Exit)
    } else {
        None
    }
}

pub(crate) fn draw_control_panel(state: &mut AppRuntime) -> Option<MenuAction> {
    let record_count = state.record_count();

    let mut clicked = None;
    widgets::Window::new(hash!(), vec2(PANEL_X, PANEL_Y), vec2(PANEL_WIDTH, PANEL_HEIGHT))
        .label("Projectile Controls")
        .ui(&mut *root_ui(), |ui| {
            ui.label(None, &format!("Saved projectiles: {record_count}"));
            ui.separator();
            ui.input_text(hash!(), "Speed (m/s)", &mut state.speed_text);
            ui.input_text(hash!(), "Angle (deg)", &mut state.angle_text);
            ui.input_text(hash!(), "Index", &mut state.index_text);
            ui.input_text(hash!(), "Limit (s)", &mut state.limit_text);
            ui.separator();
            for action in MenuAction::ALL {
                if ui.button(None, action.label()) {
                    clicked = Some(action);
                }
            }
            ui.separator();
            ui.label(None, "Esc closes the window");
        });

    clicked
}
