mod app;

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;
use macroquad::prelude::Conf;

use keyscope::config::{self, Config};

fn window_conf(config: &Config) -> Conf {
    Conf {
        window_title: "Keyscope".into(),
        fullscreen: false,
        sample_count: 1,
        window_width: config.window.width,
        window_height: config.window.height,
        window_resizable: true,
        high_dpi: false,
        ..Default::default()
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let explicit = std::env::args_os().nth(1).map(PathBuf::from);
    let (config, source) = config::resolve(explicit).context("loading configuration")?;
    match &source {
        Some(path) => info!("configuration from {}", path.display()),
        None => info!("no configuration file, using defaults"),
    }
    let style = config.scope.style().context("reading scope theme")?;

    macroquad::Window::from_config(window_conf(&config), app::run(style, config.audio.gain));
    Ok(())
}
