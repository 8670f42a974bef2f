#[tokio::main]
async fn main() -> anyhow::Result<()> {
    exchange_lib::run().await
}
