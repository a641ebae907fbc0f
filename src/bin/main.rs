#![forbid(unsafe_code)]

use colored::*;

fn main() {
    println!("{}", "PowLedger CLI".bright_cyan().bold());
    println!("{}", "-------------".bright_cyan());
    println!();
    println!(
        "{}",
        "This is the main entry point, but functionality lives in separate binaries.".yellow()
    );
    println!(
        "{}",
        "Use 'cargo run --bin <binary_name>' to run a specific command.".yellow()
    );
    println!();
    println!("{}", "Available binaries:".bright_green().underline());
    println!(
        "  - {}  {}",
        "powledger-node".bright_white(),
        "serve the ledger over HTTP".dimmed()
    );
    println!(
        "  - {}  {}",
        "powledger-mine".bright_white(),
        "mine blocks into a local in-memory ledger".dimmed()
    );
    println!();
    println!("{}", "Example:".bright_green().underline());
    println!("{}", "  cargo run --bin powledger-node -- --port 5000".italic());
}
