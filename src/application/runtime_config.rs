use std::path::PathBuf;

use crate::cli::Cli;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// `None` disables persistence entirely.
    pub state_file: Option<PathBuf>,
    pub load_saved: bool,
    pub demo: bool,
    pub color: bool,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            state_file: (!cli.no_persist).then_some(cli.state_file),
            load_saved: !cli.fresh,
            demo: cli.demo,
            color: cli.color.resolve(),
        }
    }
}
