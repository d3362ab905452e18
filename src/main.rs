use std::env;

use gate_ledger::csv::{read_commands, write_accounts};
use gate_ledger::{Gateway, RateLimits};
use tokio_stream::wrappers::ReceiverStream;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse().unwrap()))
        .with_writer(std::io::stderr)
        .init();

    let path = env::args()
        .nth(1)
        .expect("usage: gate-ledger <commands.csv>");

    if !path.ends_with(".csv") {
        warn!(path, "input file seems to not be a csv file");
    }

    let mut gateway = Gateway::new(RateLimits::default());
    let (cmd_sender, cmd_receiver) = tokio::sync::mpsc::channel(16);

    tokio::spawn(async move {
        for result in read_commands(&path) {
            match result {
                Ok(cmd) => {
                    cmd_sender.send(cmd).await.unwrap();
                }
                Err(e) => {
                    warn!("{e}");
                }
            }
        }
    });

    gateway.run(ReceiverStream::new(cmd_receiver)).await;

    write_accounts(
        gateway
            .bank()
            .ranked()
            .into_iter()
            .map(|(id, account)| (id.to_owned(), account.balance(), account.outgoing())),
    );
}
