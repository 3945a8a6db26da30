#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = learnhub::run().await {
        eprintln!("learnhub fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
