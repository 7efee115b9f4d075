// src/main.rs

use syncroute::errors::SyncrouteError;
use syncroute::{cli, logging, run};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        match err.downcast_ref::<SyncrouteError>() {
            Some(e) => eprintln!("{}", e.report()),
            None => eprintln!("syncroute error: {err:?}"),
        }
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await?;
    Ok(())
}
