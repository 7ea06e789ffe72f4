#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hotwork_cli::cli::run().await
}
