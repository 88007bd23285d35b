mod cli;
mod host;
mod paths;
mod run;
mod settings;

use anyhow::Result;
use cli::Command;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Command::Render(args) => run::render(cli.config.as_deref(), args),
        Command::Sequence(args) => run::sequence(cli.config.as_deref(), args),
        Command::Config(args) => run::print_config(cli.config.as_deref(), args),
    }
}
