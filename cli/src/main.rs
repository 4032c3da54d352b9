mod commands;
mod terminal;

use commands::{CommandLine, Commands, check, modes, scan};
use terminal::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CommandLine::parse_args();

    logging::init(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Scan(args) => {
            let any_failed = scan::scan(args, cli.quiet).await?;
            if any_failed {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Modes => {
            modes::modes();
            Ok(())
        }
        Commands::Check { engine } => {
            if !check::check(&engine).await {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
