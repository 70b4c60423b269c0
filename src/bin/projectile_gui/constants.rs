use macroquad::prelude::Color;

pub const INITIAL_WINDOW_WIDTH: i32 = 1280;
pub const INITIAL_WINDOW_HEIGHT: i32 = 820;
pub const MSAA_SAMPLES: i32 = 4;

pub const PANEL_X: f32 = 18.0;
pub const PANEL_Y: f32 = 70.0;
pub const PANEL_WIDTH: f32 = 320.0;
pub const PANEL_HEIGHT: f32 = 560.0;

pub const LEFT_MARGIN: f32 = 420.0;
pub const RIGHT_MARGIN: f32 = 30.0;
pub const TOP_MARGIN: f32 = 80.0;
pub const PLOT_HEIGHT_RATIO: f32 = 0.5;
pub const MESSAGE_GAP: f32 = 60.0;

pub const TITLE_Y: f32 = 44.0;
pub const TRAJECTORY_SAMPLES: usize = 240;
pub const MAX_MESSAGES: usize = 40;
pub const MESSAGE_LINE_HEIGHT: f32 = 20.0;
pub const X_GRID_LINES: usize = 10;
pub const Y_GRID_LINES: usize = 5;

pub const BACKGROUND: Color = Color::new(0.96, 0.96, 0.97, 1.0);
pub const GRID_COLOR: Color = Color::new(0.82, 0.84, 0.87, 1.0);
pub const PATH_COLOR: Color = Color::new(0.12, 0.47, 0.71, 1.0);
pub const ERROR_COLOR: Color = Color::new(0.75, 0.16, 0.16, 1.0);
