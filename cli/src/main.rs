mod commands;
mod terminal;

use std::process::ExitCode;

use commands::{CommandLine, Commands, discover};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let commands = CommandLine::parse_args();

    logging::init(commands.verbose)?;
    print::banner(commands.no_banner, commands.quiet);

    match commands.command {
        Commands::Discover(ref args) => {
            let cfg = args.to_config(commands.quiet, commands.no_banner);
            print::header("getting ready for discovery", cfg.quiet);
            discover::discover(&cfg, args.simulate).await
        }
    }
}
