use projectile_analyzer::core::ballistics::{ProjectileSummary, Trajectory, TrajectorySample};
use projectile_analyzer::core::command::Session;
use projectile_analyzer::core::config::AppConfig;
use projectile_analyzer::core::error::Result;
use projectile_analyzer::core::window::AxisWindow;

use crate::constants::{MAX_MESSAGES, TRAJECTORY_SAMPLES};

#[derive(Clone)]
pub(crate) struct Message {
    pub(crate) text: String,
    pub(crate) is_error: bool,
}

/// Flight path currently shown in the plot area.
pub(crate) struct PlotView {
    pub(crate) index: usize,
    pub(crate) summary: ProjectileSummary,
    pub(crate) samples: Vec<TrajectorySample>,
    pub(crate) window: AxisWindow,
}

impl PlotView {
    pub(crate) fn new(index: usize, trajectory: &Trajectory) -> Result<Self> {
        let summary = *trajectory.summary();
        let samples: Vec<TrajectorySample> =
            Trajectory::with_samples(summary, TRAJECTORY_SAMPLES)?.iter().collect();
        let window = AxisWindow::for_flight_path(&samples);
        Ok(Self {
            index,
            summary,
            samples,
            window,
        })
    }
}

pub(crate) struct AppRuntime {
    pub(crate) session: Option<Session>,
    pub(crate) speed_text: String,
    pub(crate) angle_text: String,
    pub(crate) index_text: String,
    pub(crate) limit_text: String,
    pub(crate) messages: Vec<Message>,
    pub(crate) plot: Option<PlotView>,
    pub(crate) exit_requested: bool,
}

impl AppRuntime {
    pub(crate) fn new(config: AppConfig) -> Self {
        let limit_text = config.default_limit_s.to_string();
        let mut state = Self {
            session: None,
            speed_text: String::new(),
            angle_text: String::new(),
            index_text: "0".to_string(),
            limit_text,
            messages: Vec::new(),
            plot: None,
            exit_requested: false,
        };

        match Session::open(config) {
            Ok(session) => {
                state.push_info(format!(
                    "Loaded {} projectile(s) from {}",
                    session.records().len(),
                    session.store().path().display()
                ));
                state.session = Some(session);
            }
            Err(err) => state.push_error(format!("Could not open data file: {err}")),
        }
        state
    }

    pub(crate) fn record_count(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.records().len())
    }

    pub(crate) fn push_info(&mut self, text: impl Into<String>) {
        self.push(text.into(), false);
    }

    pub(crate) fn push_error(&mut self, text: impl Into<String>) {
        self.push(text.into(), true);
    }

    fn push(&mut self, text: String, is_error: bool) {
        for line in text.lines() {
            self.messages.push(Message {
                text: line.to_string(),
                is_error,
            });
        }
        let overflow = self.messages.len().saturating_sub(MAX_MESSAGES);
        self.messages.drain(..overflow);
    }
}
