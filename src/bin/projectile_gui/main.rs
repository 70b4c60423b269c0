use clap::Parser;
use macroquad::prelude::Conf;

use projectile_analyzer::core::config::{AppConfig, ConfigArgs, init_tracing};

mod app;
mod constants;
mod controls;
mod render;
mod state;

#[derive(Parser, Debug)]
#[command(name = "projectile_gui", version, about = "Projectile analyzer window")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,
}

fn window_conf() -> Conf {
    app::window_conf()
}

#[macroquad::main(window_conf)]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.config.verbose);

    match AppConfig::try_from(&cli.config) {
        Ok(config) => app::run(config).await,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(2);
        }
    }
}
