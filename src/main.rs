//! apodcache - Astronomy Picture of the Day with a content-addressed cache
//!
//! Entry point for the apodcache CLI application.

use apodcache::{
    cli::Cli,
    error::{ExitCode, StructuredError},
};
use clap::Parser;
use yansi::Paint;

fn main() {
    let cli = Cli::parse();
    let json_errors = cli.json_errors;
    if cli.no_color {
        yansi::disable();
    }

    match apodcache::run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            let exit_code = ExitCode::for_error(&err);

            if json_errors {
                let structured = StructuredError::new(&err, exit_code);
                match serde_json::to_string_pretty(&structured) {
                    Ok(json) => eprintln!("{}", json),
                    Err(_) => eprintln!("[{}] Error: {:#}", exit_code.code_prefix(), err),
                }
            } else {
                let prefix = format!("[{}] Error:", exit_code.code_prefix());
                eprintln!("{} {:#}", prefix.red().bold(), err);
            }

            std::process::exit(exit_code.as_i32());
        }
    }
}
