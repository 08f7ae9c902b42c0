//! mdtoggle - Main Entry Point
//!
//! Applies one formatting command to a buffer read from a file or stdin and
//! prints the result.

mod cli;

use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use log::{debug, error, info};

use cli::{CliArgs, CliCommand, CliOutput};
use mdtoggle::config::save_config_silent;
use mdtoggle::editor::{CommandOutcome, CommandRunner, Key, KeyPress, SelectionAdapter, TextBuffer};
use mdtoggle::markdown::LinkKind;
use mdtoggle::{Error, Result};

fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> Result<()> {
    let settings = args.settings()?;
    if args.save_settings && save_config_silent(&settings) {
        info!("Settings saved to the user config");
    }
    let text = read_input(args.file.as_deref())?;
    let (start, end) = args.selection(&text);

    let runner = CommandRunner::new(&settings);
    let mut buffer = TextBuffer::new(text).with_selection(start, end);
    let mut prompt = |_: LinkKind| -> Option<String> { args.url.clone() };

    let outcome = match args.command {
        CliCommand::Format(command) => runner.run(&mut buffer, command, &mut prompt),
        CliCommand::Enter => runner.handle_key(&mut buffer, KeyPress::plain(Key::Enter), &mut prompt),
        CliCommand::Tab => runner.handle_key(&mut buffer, KeyPress::plain(Key::Tab), &mut prompt),
    };
    debug!("Command finished: {:?}", outcome);
    if outcome == CommandOutcome::Cancelled {
        debug!("No url given, buffer left unchanged");
    }

    let state = buffer.capture_state();

    if args.write {
        if let Some(path) = &args.file {
            fs::write(path, &state.text).map_err(|e| Error::FileWrite {
                path: path.clone(),
                source: e,
            })?;
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&CliOutput::from(&state))?);
    } else if !args.write {
        print!("{}", state.text);
    }
    Ok(())
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        }),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}
