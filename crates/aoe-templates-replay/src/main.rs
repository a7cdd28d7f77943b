//! Replay entry point (native).

use aoe_templates_replay::{load_script, run};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let Some(path) = std::env::args().nth(1).map(PathBuf::from) else {
        eprintln!("Usage: aoe-replay <script.json>");
        return ExitCode::from(2);
    };
    log::info!("Replaying {}", path.display());

    let report = load_script(&path)
        .and_then(|script| pollster::block_on(run(script)))
        .and_then(|report| report.to_json());

    match report {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Replay failed: {}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
