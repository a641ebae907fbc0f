#![forbid(unsafe_code)]
//! Offline miner: seals blocks into a fresh in-memory ledger and checks the
//! resulting chain.

use clap::Parser;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Color as TableColor;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Instant;

use powledger::blockchain::Blockchain;
use powledger::miner::{ProofOfWork, DIFFICULTY, MAX_DIFFICULTY};

#[derive(Parser, Debug)]
#[command(version, about = "Mine blocks into a local in-memory ledger", long_about = None)]
struct Args {
    /// Number of blocks to mine after genesis
    #[arg(short, long, default_value_t = 3)]
    blocks: u64,

    /// Number of leading zero hex characters a proof digest needs
    #[arg(short, long, default_value_t = DIFFICULTY)]
    difficulty: usize,

    /// Identifier credited with mining rewards
    #[arg(short, long, default_value = "local-miner")]
    miner: String,

    /// Print the final chain as JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    if args.difficulty == 0 || args.difficulty > MAX_DIFFICULTY {
        return Err(format!("difficulty must be between 1 and {}", MAX_DIFFICULTY).into());
    }

    let mut chain = Blockchain::with_proof_of_work(ProofOfWork::new(args.difficulty));

    let progress = ProgressBar::new(args.blocks);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let started = Instant::now();
    for _ in 0..args.blocks {
        let block = chain.mine(&args.miner);
        progress.set_message(format!("block #{} proof {}", block.index, block.proof));
        progress.inc(1);
    }
    progress.finish_and_clear();
    let elapsed = started.elapsed();

    if args.json {
        println!("{}", serde_json::to_string_pretty(chain.chain())?);
    } else {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("Index")
                    .fg(TableColor::Cyan)
                    .add_attribute(Attribute::Bold),
                Cell::new("Proof")
                    .fg(TableColor::Cyan)
                    .add_attribute(Attribute::Bold),
                Cell::new("Transfers")
                    .fg(TableColor::Cyan)
                    .add_attribute(Attribute::Bold),
                Cell::new("Previous Hash")
                    .fg(TableColor::Cyan)
                    .add_attribute(Attribute::Bold),
                Cell::new("Hash")
                    .fg(TableColor::Cyan)
                    .add_attribute(Attribute::Bold),
            ]);

        for block in chain.chain() {
            table.add_row(vec![
                Cell::new(if block.is_genesis() {
                    format!("#{} (genesis)", block.index)
                } else {
                    format!("#{}", block.index)
                })
                .fg(TableColor::White),
                Cell::new(block.proof).fg(TableColor::Yellow),
                Cell::new(block.transactions.iter().filter(|tx| !tx.is_reward()).count())
                    .fg(TableColor::White),
                Cell::new(format_hash(&block.previous_hash)).fg(TableColor::Grey),
                Cell::new(format_hash(&block.hash())).fg(TableColor::Green),
            ]);
        }
        println!("{table}");
    }

    println!(
        "{}",
        format!(
            "Mined {} block(s) at difficulty {} in {:.3}s",
            args.blocks,
            args.difficulty,
            elapsed.as_secs_f64()
        )
        .bright_white()
    );

    match chain.is_valid() {
        Ok(()) => println!("{}", "Chain is valid".green().bold()),
        Err(violation) => {
            println!("{} {}", "Chain is invalid:".red().bold(), violation);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn format_hash(hash: &str) -> String {
    if hash.len() > 20 {
        format!("{}...{}", &hash[..10], &hash[hash.len() - 10..])
    } else {
        hash.to_string()
    }
}
