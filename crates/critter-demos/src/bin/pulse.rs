use std::process::ExitCode;

use critter_demos::apps::{ColorMode, Critter};
use critter_engine::window::RuntimeConfig;

fn main() -> ExitCode {
    critter_demos::launch(RuntimeConfig::default(), Critter::new(ColorMode::Pulse))
}
