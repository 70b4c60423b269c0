use macroquad::prelude::*;

use projectile_analyzer::core::window::AxisWindow;

use crate::constants::{
    ERROR_COLOR, GRID_COLOR, MESSAGE_LINE_HEIGHT, PATH_COLOR, X_GRID_LINES, Y_GRID_LINES,
};
use crate::state::{Message, PlotView};

/// Screen-space rectangle the flight path is drawn into.
#[derive(Clone, Copy)]
pub(crate) struct PlotArea {
    pub(crate) left: f32,
    pub(crate) right: f32,
    pub(crate) top: f32,
    pub(crate) bottom: f32,
}

pub(crate) fn world_to_screen(x: f64, y: f64, window: &AxisWindow, area: PlotArea) -> Vec2 {
    let tx = (x / window.x_span()) as f32;
    let ty = ((y - window.y_min) / window.y_span()) as f32;
    vec2(
        area.left + tx * (area.right - area.left),
        area.bottom - ty * (area.bottom - area.top),
    )
}

fn format_axis_value(value: f64, axis_max: f64) -> String {
    if axis_max >= 1000.0 {
        format!("{value:.0}")
    } else if axis_max >= 100.0 {
        format!("{value:.1}")
    } else {
        format!("{value:.2}")
    }
}

pub(crate) fn draw_ui_text(text: &str, x: f32, y: f32, font_size: u16, color: Color) {
    draw_text_ex(
        text,
        x,
        y,
        TextParams {
            font_size,
            color,
            ..Default::default()
        },
    );
}

pub(crate) fn draw_grid(area: PlotArea) {
    for i in 0..=X_GRID_LINES {
        let t = i as f32 / X_GRID_LINES as f32;
        let x = area.left + t * (area.right - area.left);
        draw_line(x, area.top, x, area.bottom, 1.0, GRID_COLOR);
    }
    for i in 0..=Y_GRID_LINES {
        let t = i as f32 / Y_GRID_LINES as f32;
        let y = area.bottom - t * (area.bottom - area.top);
        draw_line(area.left, y, area.right, y, 1.0, GRID_COLOR);
    }
}

pub(crate) fn draw_axis_tick_labels(area: PlotArea, window: &AxisWindow) {
    let label_color = Color::from_rgba(105, 113, 124, 255);
    let tick_font_size: u16 = 16;

    for i in 0..=X_GRID_LINES {
        let t = i as f64 / X_GRID_LINES as f64;
        let x = area.left + t as f32 * (area.right - area.left);
        let label = format_axis_value(t * window.x_max, window.x_max);
        let size = measure_text(&label, None, tick_font_size, 1.0);
        draw_ui_text(
            &label,
            x - (size.width * 0.5),
            area.bottom + 20.0,
            tick_font_size,
            label_color,
        );
    }

    for i in 0..=Y_GRID_LINES {
        let t = i as f64 / Y_GRID_LINES as f64;
        let y = area.bottom - t as f32 * (area.bottom - area.top);
        let label = format_axis_value(window.y_min + t * window.y_span(), window.y_max);
        let size = measure_text(&label, None, tick_font_size, 1.0);
        draw_ui_text(
            &label,
            area.left - size.width - 8.0,
            y + (size.height * 0.5),
            tick_font_size,
            label_color,
        );
    }

    draw_ui_text("Distance (m)", area.right - 96.0, area.bottom + 42.0, 18, DARKGRAY);
    draw_ui_text("Height (m)", area.left - 56.0, area.top - 12.0, 18, DARKGRAY);
}

pub(crate) fn draw_flight_path(plot: &PlotView, area: PlotArea) {
    draw_grid(area);
    draw_axis_tick_labels(area, &plot.window);

    let points: Vec<Vec2> = plot
        .samples
        .iter()
        .map(|s| world_to_screen(s.distance_m, s.height_m, &plot.window, area))
        .collect();
    for segment in points.windows(2) {
        draw_line(
            segment[0].x,
            segment[0].y,
            segment[1].x,
            segment[1].y,
            3.0,
            PATH_COLOR,
        );
    }

    let summary = plot.summary;
    let apex = world_to_screen(
        summary.max_range_m * 0.5,
        summary.max_height_m,
        &plot.window,
        area,
    );
    let landing = world_to_screen(summary.max_range_m, 0.0, &plot.window, area);
    draw_circle(apex.x, apex.y, 5.0, PATH_COLOR);
    draw_circle(landing.x, landing.y, 5.0, PATH_COLOR);
    draw_ui_text(
        &format!("{:.2} m", summary.max_height_m),
        apex.x + 8.0,
        apex.y - 8.0,
        18,
        DARKGRAY,
    );
    draw_ui_text(
        &format!("{:.2} m", summary.max_range_m),
        (landing.x - 40.0).max(area.left),
        landing.y - 10.0,
        18,
        DARKGRAY,
    );
    draw_ui_text(
        &format!(
            "Projectile {}: {} m/s at {} deg, flight time {:.2} s",
            plot.index, summary.speed_mps, summary.angle_deg, summary.time_of_flight_s
        ),
        area.left,
        area.top - 34.0,
        20,
        BLACK,
    );
}

pub(crate) fn draw_empty_plot(area: PlotArea) {
    draw_grid(area);
    draw_ui_text(
        "Use Plot Trajectory to draw a saved projectile",
        area.left + 20.0,
        area.top + 30.0,
        20,
        GRAY,
    );
}

/// Draws the newest messages that fit between `top` and `bottom`.
pub(crate) fn draw_messages(messages: &[Message], left: f32, top: f32, bottom: f32) {
    let capacity = ((bottom - top) / MESSAGE_LINE_HEIGHT).max(0.0) as usize;
    let start = messages.len().saturating_sub(capacity);
    for (row, message) in messages[start..].iter().enumerate() {
        let color = if message.is_error { ERROR_COLOR } else { BLACK };
        draw_ui_text(
            &message.text,
            left,
            top + (row as f32 + 1.0) * MESSAGE_LINE_HEIGHT,
            18,
            color,
        );
    }
}
