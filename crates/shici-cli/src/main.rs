// shici-cli: command-line frontend for shici-core
// Argument parsing, logging setup, result rendering

mod cli;
mod output;

use cli::{Cli, Command};
use log::LevelFilter;
use output::OutputHandler;
use shici_core::{LoadOptions, Shici};
use std::io::{self, Write};
use std::process::ExitCode;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

async fn run(cli: Cli) -> shici_core::Result<bool> {
    let shici = Shici::load(LoadOptions {
        home: cli.home,
        data_location: cli.data,
    })?;
    shici.exam_mode().set(cli.exam);

    let output = OutputHandler::new(cli.json, shici.exam_mode().is_enabled());
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let found = match cli.command {
        Command::Poem { id } => match shici.get_poem(&id).await? {
            Some(poem) => {
                output.poem(&mut out, &poem)?;
                true
            }
            None => {
                eprintln!("no poem with id '{}'", id);
                false
            }
        },
        Command::Search { keyword } => {
            output.poems(&mut out, &shici.search(&keyword).await?)?;
            true
        }
        Command::Popular { limit } => {
            let limit = limit.unwrap_or(shici.config.popular_limit);
            output.poems(&mut out, &shici.popular_n(limit).await?)?;
            true
        }
        Command::Category { id } => {
            output.entries(&mut out, &shici.category(id.as_deref()).await?)?;
            true
        }
        Command::Dict { word } => match shici.lookup_word(&word).await? {
            Some(entry) => {
                output.dictionary_entry(&mut out, &entry)?;
                true
            }
            None => {
                eprintln!("'{}' not found in dictionary", word);
                false
            }
        },
        Command::History { clear } => {
            if clear {
                shici.clear_history().await?;
            } else {
                output.words(&mut out, &shici.get_history().await)?;
            }
            true
        }
    };

    log::debug!("cache: {:?}", shici.cache_stats().await);
    out.flush()?;
    Ok(found)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("[ERROR] {}", e);
            ExitCode::from(2)
        }
    }
}
