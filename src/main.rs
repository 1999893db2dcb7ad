// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use clap::{crate_version, Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use vibrator::capture::Request;
use vibrator::config;
use vibrator::controller::{keyboard, touch, Controller};

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A vibration pattern player and recorder."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lists all stored patterns.
    Patterns {
        /// The path to the player config.
        config_path: String,
    },
    /// Lists the commands the player understands.
    Commands {
        /// The path to the player config.
        config_path: String,
    },
    /// Plays a single pattern through the configured sink.
    Play {
        /// The path to the player config.
        config_path: String,
        /// The name of the pattern to play.
        pattern_name: String,
        /// Scaling steps to apply. Negative is faster, positive is slower.
        #[arg(short, long, default_value_t = 0, allow_hyphen_values = true)]
        steps: i32,
    },
    /// Captures a new pattern from the keyboard. Each Enter toggles between pressed and
    /// released; the capture starts with the first press.
    Capture {
        /// The path to the player config.
        config_path: String,
        /// The name of the new pattern.
        pattern_name: String,
        /// How long to capture for, in seconds.
        seconds: u64,
    },
    /// Deletes a stored pattern.
    Delete {
        /// The path to the player config.
        config_path: String,
        /// The name of the pattern to delete.
        pattern_name: String,
    },
    /// Replaces all stored patterns with the predefined ones.
    Reset {
        /// The path to the player config.
        config_path: String,
    },
    /// Start will start the player, controlled by phrases typed on the keyboard.
    Start {
        /// The path to the player config.
        config_path: String,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    // The stdin drivers block on reads that can't be interrupted, so the runtime is shut down
    // without waiting for them once the command is done.
    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(run(cli));
    runtime.shutdown_background();
    result
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Commands::Patterns { config_path } => {
            let config = config::load(&PathBuf::from(config_path))?;
            let manager = config::init_manager(&config)?;
            let patterns = manager.patterns();
            let patterns = patterns.read();

            if patterns.is_empty() {
                println!("No patterns found.");
                return Ok(());
            }
            print!("{}", patterns);
        }
        Commands::Commands { config_path } => {
            let config = config::load(&PathBuf::from(config_path))?;
            println!("Commands:");
            for command in config.vocabulary()?.commands() {
                println!("  - {}", command);
            }
            println!("  - <pattern name>: Switch to the named pattern.");
        }
        Commands::Play {
            config_path,
            pattern_name,
            steps,
        } => {
            let config = config::load(&PathBuf::from(config_path))?;
            let manager = config::init_manager(&config)?;
            let mut player = config::init_player(&config, manager.patterns())?;

            player.select(&pattern_name)?;
            player.start()?;
            for _ in 0..steps.unsigned_abs() {
                let scaled = if steps < 0 {
                    player.faster()?
                } else {
                    player.slower()?
                };
                if !scaled {
                    println!("Pattern can't be scaled any further.");
                    break;
                }
            }
            println!(
                "Playing {} with modifier {}.",
                player.selected().unwrap_or_default(),
                player.modifier()
            );
            player.stop();
        }
        Commands::Capture {
            config_path,
            pattern_name,
            seconds,
        } => {
            let config = config::load(&PathBuf::from(config_path))?;
            let mut manager = config::init_manager(&config)?;
            let request = Request::new(&pattern_name, manager.capture_duration(seconds)?);

            let (touches_tx, mut touches_rx) = mpsc::channel(16);
            let driver = touch::Driver::new();
            let _monitor = driver.monitor_touches(touches_tx);

            println!("Press Enter to start capturing {}.", pattern_name);
            let captured = manager
                .run_capture(request, &mut touches_rx, |remaining| {
                    println!("{} seconds left.", remaining)
                })
                .await;
            let saved = manager.pause();

            match captured? {
                Some(pattern) => println!("Captured {}", pattern),
                None => println!("Capture of {} was aborted.", pattern_name),
            }
            saved?;
        }
        Commands::Delete {
            config_path,
            pattern_name,
        } => {
            let config = config::load(&PathBuf::from(config_path))?;
            let mut manager = config::init_manager(&config)?;
            manager.select(&pattern_name)?;
            let deleted = manager.delete()?;
            manager.pause()?;
            println!("Deleted {}", deleted);
        }
        Commands::Reset { config_path } => {
            let config = config::load(&PathBuf::from(config_path))?;
            let mut manager = config::init_manager(&config)?;
            manager.reset()?;
            manager.pause()?;
            print!("{}", manager.patterns().read());
        }
        Commands::Start { config_path } => {
            let config = config::load(&PathBuf::from(config_path))?;
            let manager = config::init_manager(&config)?;
            let player = config::init_player(&config, manager.patterns())?;
            let vocabulary = config.vocabulary()?;
            let driver = Arc::new(keyboard::Driver::new(vocabulary.reserved_words()));

            let mut controller = Controller::new(player, vocabulary, driver)?;
            controller.join().await?;
        }
    }

    Ok(())
}
