//! Replay a gesture script and print the result (native).

#[cfg(feature = "native")]
fn main() -> std::process::ExitCode {
    use std::process::ExitCode;

    env_logger::init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: easel <script.json>");
        return ExitCode::FAILURE;
    };
    log::info!("Replaying {path}");

    let report = easel_app::replay_file(&path).and_then(|report| Ok(report.to_json()?));
    match report {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Replay failed: {e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
