use std::env;
use std::path::PathBuf;
use std::process;

use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;
use vend_eng::csv::{read_commands, write_outputs};
use vend_eng::{Machine, MachineConfig, PinAuthorizer, Session};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse().unwrap()))
        .with_writer(std::io::stderr)
        .init();

    let path = PathBuf::from(
        env::args()
            .nth(1)
            .expect("usage: vend-eng <session.csv>"),
    );

    if path.extension().is_none_or(|ext| ext != "csv") {
        warn!(path = %path.display(), "input file seems to not be a csv file");
    }

    let config = MachineConfig::from_env().unwrap_or_else(|e| {
        error!("invalid configuration: {e}");
        process::exit(2);
    });
    let machine = Machine::from_config(&config).unwrap_or_else(|e| {
        error!("invalid product seed: {e}");
        process::exit(2);
    });
    let mut session = Session::new(machine, PinAuthorizer::new(config.admin_pin.clone()));

    let commands = read_commands(path).unwrap_or_else(|e| {
        error!("{e}");
        process::exit(1);
    });
    let (cmd_sender, cmd_receiver) = tokio::sync::mpsc::channel(16);

    tokio::spawn(async move {
        for result in commands {
            match result {
                Ok(command) => {
                    if cmd_sender.send(command).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("{e}");
                }
            }
        }
    });

    let outputs = session.run(ReceiverStream::new(cmd_receiver)).await;

    if let Err(e) = write_outputs(std::io::stdout().lock(), outputs) {
        error!("{e}");
        process::exit(1);
    }
}
