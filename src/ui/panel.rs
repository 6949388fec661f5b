// src/ui/panel.rs
//! Viewer panels
//!
//! The navigation panel exposes the five toggles that drive the camera mode
//! switch; the status panel surfaces asset-load progress and failures.

use crate::assets::{AssetStatusBoard, StageStatus};
use crate::settings::ViewerSettings;

/// Draws the navigation settings panel.
///
/// Returns true when any toggle changed this frame, in which case the
/// caller must run the mode switch with the fresh snapshot before the
/// controllers advance.
pub fn navigation_panel(ui: &imgui::Ui, settings: &mut ViewerSettings) -> bool {
    let mut changed = false;

    ui.window("Navigation")
        .size([280.0, 220.0], imgui::Condition::FirstUseEver)
        .position([20.0, 20.0], imgui::Condition::FirstUseEver)
        .resizable(true)
        .collapsible(true)
        .build(|| {
            changed |= ui.checkbox("First person", &mut settings.first_person);
            changed |= ui.checkbox("Gravity", &mut settings.gravity);
            changed |= ui.checkbox("Collision", &mut settings.collision);
            changed |= ui.checkbox("Position easing", &mut settings.position_easing);
            changed |= ui.checkbox("Third person", &mut settings.three_person);

            ui.separator();
            if settings.first_person || settings.three_person {
                ui.text_disabled("Drag to look, WASD to move");
            } else {
                ui.text_disabled("Drag to orbit, scroll to zoom");
                ui.text_disabled("Shift+drag to pan");
            }
        });

    changed
}

/// Draws the asset status panel in the corner opposite the navigation
/// panel. Failures stay visible for the rest of the session.
pub fn status_panel(ui: &imgui::Ui, status: &AssetStatusBoard) {
    let display_size = ui.io().display_size;
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return;
    }

    ui.window("Assets")
        .size([320.0, 110.0], imgui::Condition::FirstUseEver)
        .position(
            [display_size[0] - 340.0, 20.0],
            imgui::Condition::FirstUseEver,
        )
        .collapsible(true)
        .build(|| {
            render_stage_line(ui, "Environment", &status.environment);
            render_stage_line(ui, "Model", &status.model);
        });
}

fn render_stage_line(ui: &imgui::Ui, label: &str, status: &StageStatus) {
    match status {
        StageStatus::Pending => ui.text(format!("{label}: loading...")),
        StageStatus::Ready => ui.text(format!("{label}: ready")),
        StageStatus::Failed(message) => {
            ui.text_colored([1.0, 0.35, 0.35, 1.0], format!("{label}: {message}"));
        }
    }
}
