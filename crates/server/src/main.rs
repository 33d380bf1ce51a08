#[tokio::main]
async fn main() -> anyhow::Result<()> {
    linkhint_server::start().await
}
