use std::process::ExitCode;

use anyhow::Context;
use gpu_life::config::{Command, USAGE};
use gpu_life::{LifeApp, LifeConfig, LifeError};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match LifeConfig::from_args(std::env::args().skip(1)) {
        Ok(Command::Run(config)) => config,
        Ok(Command::Help) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("error: {err}\n\n{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            let code = err
                .downcast_ref::<LifeError>()
                .map_or(gpu_life::error::STARTUP_FAILURE_EXIT_CODE, LifeError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn run(config: LifeConfig) -> anyhow::Result<()> {
    log::info!(
        "grid {}x{}, rule {}, {:?} edges, {} ticks per frame",
        config.grid.width,
        config.grid.height,
        config.rule,
        config.edges,
        config.ticks_per_frame
    );

    let summary = LifeApp::new(config)
        .run()
        .context("game of life stopped with an error")?;
    log::info!("{} ticks, {} frames", summary.ticks, summary.frames);
    Ok(())
}
