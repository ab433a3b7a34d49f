mod config;
mod error;
mod gacha;
mod i18n;
mod ledger;
mod pricing;
mod rng;
mod shell;
mod sim; // Batch statistics
mod table;
mod worker;

use clap::{Parser, Subcommand};
use config::Config;
use error::GachaError;
use i18n::{I18n, Language};
use log::{error, info};
use rng::Rng;
use shell::Shell;
use sim::{format_frequency_lines, simulate_stats};
use std::io;
use std::time::Instant;
use table::OutcomeTable;
use worker::WorkerPool;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "data/config.json")]
    config: String,

    /// Random seed (optional; draws are clock-seeded otherwise)
    #[arg(short, long)]
    seed: Option<u64>,

    /// UI language: en or ja
    #[arg(short, long)]
    lang: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Run the interactive simulator (default)
    Interactive,
    /// Roll many independent batches and report observed rates
    Simulate {
        /// Number of batches
        #[arg(short = 'n', long, default_value_t = 100_000)]
        count: usize,
        /// Summons per batch
        #[arg(short = 't', long, default_value_t = 10)]
        trials: u32,
        /// Use the normal banner instead of the configured one
        #[arg(long)]
        normal: bool,
    },
    /// Print the active rate table
    Table,
}

fn run(args: Args) -> Result<(), GachaError> {
    let config = Config::load(&args.config)?;
    let lang = args
        .lang
        .as_deref()
        .and_then(Language::parse)
        .unwrap_or_else(|| Language::from_config(&config));

    match args.command.clone().unwrap_or(Commands::Interactive) {
        Commands::Interactive => {
            let mut shell = Shell::new(config, lang, args.seed);
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            shell.run(stdin.lock(), &mut stdout)?;
        }
        Commands::Simulate { count, trials, normal } => {
            let pick_up = config.pick_up && !normal;
            let worker = WorkerPool::new_with_config(&config)?;
            let seed = args.seed.unwrap_or_else(|| Rng::new().next_u64());
            info!("Simulating {} batches on {} threads (seed {})", count, worker.thread_count(), seed);

            let start = Instant::now();
            let stats = simulate_stats(count, trials, pick_up, seed, &worker)?;
            let elapsed = start.elapsed();

            let table = OutcomeTable::canonical(pick_up, lang);
            println!("{}", I18n::fill(&I18n::get(lang, "sim_header"), &[&count, &trials]));
            for line in format_frequency_lines(&stats, &table) {
                println!("{}", line);
            }
            println!(
                "{}",
                I18n::fill(&I18n::get(lang, "sim_relief"), &[&stats.rare_reliefs, &stats.servant_reliefs])
            );
            let rate = format!("{:.0}", stats.total_draws() as f64 / elapsed.as_secs_f64());
            println!(
                "{}",
                I18n::fill(&I18n::get(lang, "sim_time"), &[&format!("{:.2?}", elapsed), &rate])
            );
        }
        Commands::Table => {
            let table = OutcomeTable::canonical(config.pick_up, lang);
            println!("{}", I18n::get(lang, "table_header"));
            println!("{}", table);
        }
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if let Err(e) = run(args) {
        error!("{}", e);
        std::process::exit(1);
    }
}
