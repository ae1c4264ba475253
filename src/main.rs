use anyhow::Result;

use ladder_challenges::cli::Command;
use ladder_challenges::{
    handle_import, handle_init, handle_recompute, handle_serve, handle_show, handle_standings,
    interpret,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Init => handle_init(),
        Command::Import { file } => handle_import(file),
        Command::Serve { port } => handle_serve(*port),
        Command::Recompute { season } => handle_recompute(*season),
        Command::Standings { season } => handle_standings(*season),
        Command::Show { challenge } => handle_show(*challenge),
    }
}
