//! Runtime configuration: command-line flags, each with an environment
//! variable fallback.

use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_SAVE_PATH: &str = "hole_match_progress.json";

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "hole-match", version, about = "Tap holes, park cars", long_about = None)]
pub struct GameConfig {
    /// Level catalog JSON. The built-in levels are used when unset.
    #[arg(long = "levels", env = "HOLE_MATCH_LEVELS", value_name = "PATH")]
    pub levels_path: Option<PathBuf>,

    /// Progress file.
    #[arg(
        long = "save",
        env = "HOLE_MATCH_SAVE",
        value_name = "PATH",
        default_value = DEFAULT_SAVE_PATH
    )]
    pub save_path: PathBuf,

    /// Write logs to this file.
    #[arg(long = "log", env = "HOLE_MATCH_LOG", value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Start at this level (zero-based) instead of the saved one.
    #[arg(long = "level", env = "HOLE_MATCH_START_LEVEL", value_name = "N")]
    pub start_level: Option<usize>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            levels_path: None,
            save_path: PathBuf::from(DEFAULT_SAVE_PATH),
            log_path: None,
            start_level: None,
        }
    }
}
