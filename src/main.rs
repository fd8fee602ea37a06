use clap::Parser;
use contract_source_audit::{run, Args};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let settings = args.settings()?;
    let audit = run(&args, settings).await?;
    println!("{}", serde_json::to_string_pretty(&audit)?);
    Ok(())
}
