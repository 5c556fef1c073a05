//! Runtime configuration
//!
//! Defaults match the classic setup: a 1504x1024 grid, one presentation every
//! 30 ticks, Conway's rule on a torus.

use std::path::PathBuf;

use thiserror::Error;

use crate::simulation::rule::{EdgePolicy, Rule, RuleParseError};
use crate::simulation::GridExtent;

pub const DEFAULT_GRID_WIDTH: u32 = 1504;
pub const DEFAULT_GRID_HEIGHT: u32 = 1024;
pub const DEFAULT_TICKS_PER_FRAME: u32 = 30;

pub const USAGE: &str = "\
Usage: gpu_life [OPTIONS]

Options:
  --width <CELLS>            grid width (default 1504)
  --height <CELLS>           grid height (default 1024)
  --ticks-per-frame <N>      simulation steps per presented frame (default 30)
  --scale <N>                window pixels per cell (default 1)
  --rule <RULE>              life-like rule in B/S notation (default B3/S23)
  --edges <wrap|dead>        neighbor handling at the grid border (default wrap)
  --seed <N>                 randomizer seed (default: random)
  --density <0..1>           probability that a seeded cell is live (default 0.5)
  --shader-dir <DIR>         load .wgsl overrides from DIR
  -h, --help                 print this message";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("unknown argument {0:?}")]
    UnknownArgument(String),
    #[error("missing value for {0}")]
    MissingValue(&'static str),
    #[error("invalid value {value:?} for {flag}")]
    InvalidValue { flag: &'static str, value: String },
    #[error(transparent)]
    Rule(#[from] RuleParseError),
    #[error("{0}")]
    EdgePolicy(String),
    #[error("grid dimensions must be non-zero, got {0}x{1}")]
    EmptyGrid(u32, u32),
    #[error("ticks per frame must be at least 1")]
    ZeroTicksPerFrame,
    #[error("window scale must be at least 1")]
    ZeroScale,
    #[error("density must lie in [0, 1], got {0}")]
    DensityOutOfRange(f32),
}

/// Outcome of argument parsing
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(LifeConfig),
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LifeConfig {
    pub grid: GridExtent,
    pub ticks_per_frame: u32,
    pub window_scale: u32,
    pub rule: Rule,
    pub edges: EdgePolicy,
    pub seed: Option<u32>,
    pub density: f32,
    pub shader_dir: Option<PathBuf>,
}

impl Default for LifeConfig {
    fn default() -> Self {
        Self {
            grid: GridExtent::new(DEFAULT_GRID_WIDTH, DEFAULT_GRID_HEIGHT),
            ticks_per_frame: DEFAULT_TICKS_PER_FRAME,
            window_scale: 1,
            rule: Rule::conway(),
            edges: EdgePolicy::Wrap,
            seed: None,
            density: 0.5,
            shader_dir: None,
        }
    }
}

impl LifeConfig {
    /// Parse flags (without the program name) on top of the defaults.
    pub fn from_args<I, S>(args: I) -> Result<Command, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = Self::default();
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) => (flag.to_string(), Some(value.to_string())),
                None => (arg.clone(), None),
            };

            let mut value = |name: &'static str| {
                inline
                    .clone()
                    .or_else(|| args.next())
                    .ok_or(ConfigError::MissingValue(name))
            };

            match flag.as_str() {
                "-h" | "--help" => return Ok(Command::Help),
                "--width" => config.grid.width = parse_number("--width", value("--width")?)?,
                "--height" => config.grid.height = parse_number("--height", value("--height")?)?,
                "--ticks-per-frame" => {
                    config.ticks_per_frame =
                        parse_number("--ticks-per-frame", value("--ticks-per-frame")?)?
                }
                "--scale" => config.window_scale = parse_number("--scale", value("--scale")?)?,
                "--rule" => config.rule = value("--rule")?.parse()?,
                "--edges" => {
                    config.edges = value("--edges")?
                        .parse()
                        .map_err(ConfigError::EdgePolicy)?
                }
                "--seed" => config.seed = Some(parse_number("--seed", value("--seed")?)?),
                "--density" => config.density = parse_number("--density", value("--density")?)?,
                "--shader-dir" => config.shader_dir = Some(PathBuf::from(value("--shader-dir")?)),
                _ => return Err(ConfigError::UnknownArgument(arg)),
            }
        }

        config.validate()?;
        Ok(Command::Run(config))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.width == 0 || self.grid.height == 0 {
            return Err(ConfigError::EmptyGrid(self.grid.width, self.grid.height));
        }
        if self.ticks_per_frame == 0 {
            return Err(ConfigError::ZeroTicksPerFrame);
        }
        if self.window_scale == 0 {
            return Err(ConfigError::ZeroScale);
        }
        if !(0.0..=1.0).contains(&self.density) {
            return Err(ConfigError::DensityOutOfRange(self.density));
        }
        Ok(())
    }

    /// Initial window size in physical pixels
    pub fn window_size(&self) -> (u32, u32) {
        (
            self.grid.width.saturating_mul(self.window_scale),
            self.grid.height.saturating_mul(self.window_scale),
        )
    }
}

fn parse_number<T: std::str::FromStr>(flag: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidValue { flag, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(args: &[&str]) -> Result<LifeConfig, ConfigError> {
        match LifeConfig::from_args(args.iter().copied())? {
            Command::Run(config) => Ok(config),
            Command::Help => panic!("unexpected help"),
        }
    }

    #[test]
    fn test_defaults() {
        let config = run(&[]).unwrap();
        assert_eq!(config, LifeConfig::default());
        assert_eq!(config.grid, GridExtent::new(1504, 1024));
        assert_eq!(config.ticks_per_frame, 30);
        assert_eq!(config.window_size(), (1504, 1024));
    }

    #[test]
    fn test_flags() {
        let config = run(&[
            "--width",
            "64",
            "--height=32",
            "--ticks-per-frame",
            "4",
            "--rule",
            "B36/S23",
            "--edges",
            "dead",
            "--seed",
            "7",
            "--scale",
            "3",
        ])
        .unwrap();
        assert_eq!(config.grid, GridExtent::new(64, 32));
        assert_eq!(config.ticks_per_frame, 4);
        assert_eq!(config.rule, Rule::highlife());
        assert_eq!(config.edges, EdgePolicy::Dead);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.window_size(), (192, 96));
    }

    #[test]
    fn test_help() {
        assert_eq!(LifeConfig::from_args(["--help"]), Ok(Command::Help));
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert_eq!(run(&["--ticks-per-frame", "0"]), Err(ConfigError::ZeroTicksPerFrame));
        assert_eq!(run(&["--width", "0"]), Err(ConfigError::EmptyGrid(0, 1024)));
        assert_eq!(run(&["--density", "1.5"]), Err(ConfigError::DensityOutOfRange(1.5)));
        assert_eq!(run(&["--seed"]), Err(ConfigError::MissingValue("--seed")));
        assert_eq!(
            run(&["--width", "wide"]),
            Err(ConfigError::InvalidValue {
                flag: "--width",
                value: "wide".to_string()
            })
        );
        assert_eq!(
            run(&["--fullscreen"]),
            Err(ConfigError::UnknownArgument("--fullscreen".to_string()))
        );
    }
}
