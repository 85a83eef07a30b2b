/// Train the Mines agent offline against the local simulator.
///
/// Usage:
///   cargo run --release --bin train_offline [rounds] [mode] [seed] [data_dir]
///
/// mode is `training` (random reveals, fixed cash-out) or `learning` (value guided).
/// Defaults: rounds=1000, mode=training, no seed, data_dir=data
///
/// The table is saved to <data_dir>/q_table.json, but only if data storage was already
/// granted there (send /storage on to the bot once).
use std::env;
use mines_agent::config::Config;
use mines_agent::persistence::{JsonStore, Store};
use mines_agent::training::{Trainer, TrainingConfig};
use mines_agent::utils::Mode;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args: Vec<String> = env::args().collect();

    let rounds: usize = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(1000);
    let mode = match args.get(2).map(String::as_str) {
        Some("learning") | Some("rl") => Mode::Learning,
        _ => Mode::Training,
    };
    let seed: Option<u64> = args.get(3).and_then(|s| s.parse().ok());
    let data_dir = args.get(4).cloned().unwrap_or_else(|| "data".to_string());

    println!("💣 Training Mines agent offline");
    println!("  Rounds: {}", rounds);
    println!("  Mode: {}", mode);
    println!("  Seed: {:?}", seed);
    println!("  Data directory: {}\n", data_dir);

    let store = JsonStore::open(&data_dir)?;
    if !store.permission() {
        println!("⚠️ Data storage is not permitted in {}; the trained table will not be saved.\n", data_dir);
    }
    let table = store.load_table()?;

    let config = TrainingConfig { rounds, mode, seed, checkpoint_frequency: (rounds / 10).max(1) };
    let mut trainer = Trainer::new(config, Config::default().policy(), table);
    let stats = trainer.train().clone();
    println!("  Wins: {} / {} ({:.1}%)", stats.wins, stats.games_played, stats.win_rate() * 100.0);
    println!("  Average diamonds: {:.2}", stats.average_diamonds());

    match trainer.save_to(&store) {
        Ok(true) => println!("✅ Training run complete. {} values saved to {}", trainer.table().len(), store.dir().display()),
        Ok(false) => println!("✅ Training run complete. Table not saved (no storage permission)."),
        Err(e) => println!("⚠️ Training complete, but failed to save the table: {e}"),
    }
    Ok(())
}
