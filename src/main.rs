mod command;
mod config;
mod dispatcher;
mod error;
mod events;
mod job;
mod path_selector;
mod printer;
mod process_group;
mod reaper;
mod registry;
mod retention;
mod scanner;
mod spawner;
mod transport;
mod types;

use std::io::{self, BufRead, Write};

use config::SupervisorConfig;
use dispatcher::{ExecutionAction, Supervisor};

fn main() {
    env_logger::init();

    let config = SupervisorConfig::from_env();
    let mut supervisor = match Supervisor::new(config) {
        Ok(supervisor) => supervisor,
        Err(err) => {
            eprintln!("imprimer: failed to start: {err}");
            std::process::exit(-1);
        }
    };

    if let Err(err) = supervisor.install_signal_handler() {
        eprintln!("imprimer: failed to install signal handler: {err}");
        std::process::exit(-1);
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();
    let mut exit_code: i32 = 0;

    loop {
        // Pre-block hook (§5): reap, reclaim, scan before the next blocking
        // read so a pipeline that finished "during" command input is
        // visible on this tick rather than the next.
        supervisor.pre_block_hook();

        print!("imprimer> ");
        if stdout.flush().is_err() {
            break;
        }

        match lines.next() {
            None => break,
            Some(Err(error)) if error.kind() == io::ErrorKind::Interrupted => continue,
            Some(Err(error)) => {
                eprintln!("imprimer: error reading input: {error}");
                break;
            }
            Some(Ok(line)) => match supervisor.dispatch(&line) {
                ExecutionAction::Continue => continue,
                ExecutionAction::Exit(code) => {
                    exit_code = code;
                    break;
                }
            },
        }
    }

    std::process::exit(exit_code);
}
