//! workitems - Work item sync and requirements document generator

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = workitem_docs::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
