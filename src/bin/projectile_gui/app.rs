use macroquad::prelude::*;

use projectile_analyzer::core::command::{
    Command, LaunchInput, MenuAction, Outcome, parse_angle, parse_index, parse_limit, parse_speed,
};
use projectile_analyzer::core::config::AppConfig;
use projectile_analyzer::core::error::AnalyzerError;

use crate::constants::{
    BACKGROUND, INITIAL_WINDOW_HEIGHT, INITIAL_WINDOW_WIDTH, LEFT_MARGIN, MESSAGE_GAP,
    MSAA_SAMPLES, PLOT_HEIGHT_RATIO, RIGHT_MARGIN, TITLE_Y, TOP_MARGIN,
};
use crate::controls::{draw_control_panel, hotkey_action};
use crate::render::{PlotArea, draw_empty_plot, draw_flight_path, draw_messages, draw_ui_text};
use crate::state::{AppRuntime, PlotView};

pub(crate) fn window_conf() -> Conf {
    Conf {
        window_title: "Projectile Analyzer".to_string(),
        window_width: INITIAL_WINDOW_WIDTH,
        window_height: INITIAL_WINDOW_HEIGHT,
        high_dpi: true,
        sample_count: MSAA_SAMPLES,
        ..Default::default()
    }
}

fn build_command(state: &AppRuntime, action: MenuAction) -> Result<Command, AnalyzerError> {
    Ok(match action {
        MenuAction::AddProjectiles => {
            let speed = parse_speed(&state.speed_text)?;
            let angle = parse_angle(&state.angle_text)?;
            Command::AddProjectiles(vec![LaunchInput::new(speed, angle)?])
        }
        MenuAction::Statistics => Command::Statistics,
        MenuAction::MaxRange => Command::MaxRange,
        MenuAction::MaxHeight => Command::MaxHeight,
        MenuAction::FlightTimeAbove => Command::FlightTimeAbove(parse_limit(&state.limit_text)?),
        MenuAction::TrajectoryAnalysis => {
            Command::TrajectoryAnalysis(parse_index(&state.index_text)?)
        }
        MenuAction::Compare => Command::Compare,
        MenuAction::PlotTrajectory => Command::PlotTrajectory(parse_index(&state.index_text)?),
        MenuAction::Exit => Command::Exit,
    })
}

pub(crate) fn apply_action(state: &mut AppRuntime, action: MenuAction) {
    if action == MenuAction::Exit {
        state.exit_requested = true;
        return;
    }
    if state.session.is_none() {
        state.push_error("No data file is open; restart with a readable --data-file");
        return;
    }
    if action.needs_records() && state.record_count() == 0 {
        state.push_error(AnalyzerError::EmptyInput.to_string());
        return;
    }

    let command = match build_command(state, action) {
        Ok(command) => command,
        Err(err) => {
            state.push_error(err.to_string());
            return;
        }
    };
    let result = match state.session.as_mut() {
        Some(session) => session.execute(command),
        None => return,
    };

    match result {
        Ok(Outcome::Exit) => state.exit_requested = true,
        Ok(outcome) => {
            match &outcome {
                Outcome::Added(_) => {
                    state.speed_text.clear();
                    state.angle_text.clear();
                }
                Outcome::Plot { index, trajectory } => match PlotView::new(*index, trajectory) {
                    Ok(view) => state.plot = Some(view),
                    Err(err) => {
                        state.push_error(format!("Error: {err}"));
                        return;
                    }
                },
                _ => {}
            }
            state.push_info(outcome.to_string());
        }
        Err(err) => state.push_error(format!("Error: {err}")),
    }
}

pub(crate) async fn run(config: AppConfig) {
    let mut state = AppRuntime::new(config);

    loop {
        clear_background(BACKGROUND);
        let screen_w = screen_width();
        let screen_h = screen_height();

        draw_ui_text(
            "Projectile Analyzer",
            LEFT_MARGIN,
            TITLE_Y,
            30,
            Color::from_rgba(30, 30, 35, 255),
        );

        let panel_action = draw_control_panel(&mut state);
        if let Some(action) = hotkey_action().or(panel_action) {
            apply_action(&mut state, action);
        }
        if state.exit_requested {
            break;
        }

        let area = PlotArea {
            left: LEFT_MARGIN,
            right: screen_w - RIGHT_MARGIN,
            top: TOP_MARGIN + 40.0,
            bottom: TOP_MARGIN + 40.0 + (screen_h - TOP_MARGIN) * PLOT_HEIGHT_RATIO,
        };
        match &state.plot {
            Some(plot) => draw_flight_path(plot, area),
            None => draw_empty_plot(area),
        }
        draw_messages(
            &state.messages,
            LEFT_MARGIN,
            area.bottom + MESSAGE_GAP,
            screen_h - 10.0,
        );

        next_frame().await;
    }
}
