mod platform;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = platform::Cli::parse();
    platform::initialize_logging(cli.log, cli.verbose);
    platform::run(cli)
}
