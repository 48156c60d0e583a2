use std::process::ExitCode;

use clap::Parser;

use disaster_import::{app, ImportArgs};

#[tokio::main]
async fn main() -> ExitCode {
    app::init_tracing();

    let args = ImportArgs::parse();

    let outcome = match app::run(&args).await {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match app::format_outcome(&outcome, args.json) {
        Ok(text) => println!("{}", text.trim_end()),
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
