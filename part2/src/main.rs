use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
  haversine::init_logger();

  match haversine::Args::parse().execute() {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("error: {e}");
      ExitCode::FAILURE
    }
  }
}
