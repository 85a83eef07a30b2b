use std::env;
use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use mines_agent::bot::{Bot, Event};
use mines_agent::config::Config;
use mines_agent::persistence::JsonStore;
use mines_agent::transport::SimulatedTransport;

/// Console operator id (allowed when `authorized_users` is empty)
const CONSOLE_USER: i64 = 0;

/// Play Mines against the local simulator, taking operator commands from stdin.
///
/// Usage:
///   cargo run --release -- [config.json]
///
/// Then type /startai, /trainrl, /userl, /setbet 50, /status, ... and Ctrl-D to quit.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config = Config::load(&path).with_context(|| format!("reading {path}"))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_level.as_str())).init();

    let store = JsonStore::open(&config.data_dir)
        .with_context(|| format!("opening data directory {}", config.data_dir.display()))?;
    let (tx, rx) = mpsc::unbounded_channel();
    let transport = SimulatedTransport::new(tx.clone(), config.grid_size, config.seed);

    println!("💣 Mines agent ready (game bot {}, chat {})", config.game_bot, config.group_id);
    println!("  Commands: /startai /stopai /trainrl /userl /setbet <n> /setbombs <n> /status /resume /storage on|off");

    let bot = Bot::new(config, transport, store);
    let console = async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                line = lines.next_line() => match line {
                    Ok(Some(text)) => {
                        if tx.send(Event::Command { sender: CONSOLE_USER, text }).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        log::error!("Failed to read stdin: {e}");
                        break;
                    }
                },
                _ = tokio::signal::ctrl_c() => break,
            }
        }
        let _ = tx.send(Event::Shutdown);
    };

    let (bot, _) = tokio::join!(bot.run(rx), console);
    let stats = &bot.controller().session.stats;
    println!("✅ Played {} games: {} wins, {} losses, average diamonds {:.2}",
        stats.games_played, stats.wins, stats.losses, stats.average_diamonds());
    Ok(())
}
