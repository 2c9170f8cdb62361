mod api;
mod commands;
mod defines;
mod impls;
mod order;
mod signer;
mod types;
mod util;

use api::Binance;
use clap::Parser;
use commands::execute_command;
use defines::PROMPT;
use std::io::{self, BufRead, Write};
use tracing::info;
use tracing_subscriber::EnvFilter;
use types::*;
use util::*;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    // parse arguments via clap
    let cmd_args = CommandlineArgs::parse();

    // the client holds the credentials for the whole session and is handed
    // to every command
    let client = Binance::new(TradingContext::from_env(cmd_args.testnet));
    if client.context().use_testnet {
        info!("using testnet");
    }

    if !cmd_args.command.is_empty() {
        if !run_once(&client, &cmd_args.command, cmd_args.timing) {
            std::process::exit(1);
        }
    } else {
        println!("Binance CLI started");
        if let Err(e) = run_command_loop(&client, cmd_args.timing) {
            print_error_if_necessary(e);
            std::process::exit(1);
        }
    }
}

/// Execute one command to completion. Returns whether it succeeded.
fn run_once<S: AsRef<str>>(client: &Binance, tokens: &[S], timing: bool) -> bool {
    let mut start = std::time::Instant::now();
    measure_start(&mut start);

    match execute_command(client, tokens) {
        Ok(_) => {
            measure_end(&start, timing);
            true
        }
        Err(e) => {
            print_error_if_necessary(e);
            false
        }
    }
}

/// Prompt, read a line, run it, until stdin ends.
fn run_command_loop(client: &Binance, timing: bool) -> Result<()> {
    let stdin = io::stdin();
    command_loop(
        stdin.lock(),
        || {
            print!("\n{}", PROMPT);
            io::stdout().flush()
        },
        |tokens| {
            run_once(client, tokens, timing);
        },
    )
}

/// Read `input` line by line, handing each tokenized line to `run`. Only the
/// end of input or a failing read stops it. A line that is not valid UTF-8 is
/// reported and skipped.
fn command_loop<R, P, F>(input: R, mut prompt: P, mut run: F) -> Result<()>
where
    R: BufRead,
    P: FnMut() -> io::Result<()>,
    F: FnMut(&[&str]),
{
    let mut lines = input.lines();

    loop {
        prompt()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = match line {
            Ok(line) => line,
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                print_error_if_necessary(Error::Io(e));
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        let tokens: Vec<&str> = line.split_whitespace().collect();
        run(&tokens);
    }
    Ok(())
}
