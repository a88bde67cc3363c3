mod commands;
mod terminal;

use std::time::Duration;

use commands::{CommandLine, Commands, devices, payload, resolve, watch};
use terminal::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose, commands.quiet)?;
    let cfg = commands.config();

    match commands.command {
        Commands::Resolve { payload, json } => resolve::resolve(&payload, json, &cfg).await,
        Commands::Watch { payload, interval } => {
            let interval = Duration::from_secs(interval.max(1));
            watch::watch(&payload, interval, &cfg).await
        }
        Commands::Payload { device_id, ip } => {
            payload::payload(device_id, ip);
            Ok(())
        }
        Commands::Devices => {
            devices::devices(&cfg);
            Ok(())
        }
    }
}
