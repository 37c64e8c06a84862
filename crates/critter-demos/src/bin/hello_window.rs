use std::process::ExitCode;

use critter_demos::apps::HelloWindow;
use critter_engine::window::RuntimeConfig;

fn main() -> ExitCode {
    // First step: the window closes only through the window system.
    let config = RuntimeConfig::default().with_cancel_key(None);
    critter_demos::launch(config, HelloWindow)
}
