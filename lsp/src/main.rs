#[tokio::main]
async fn main() {
    tjls_lsp::run().await;
}
