#[tokio::main]
async fn main() {
    if let Err(e) = homeocare_lib::run().await {
        tracing::error!("Homeocare failed: {e}");
        eprintln!("homeocare: {e}");
        std::process::exit(1);
    }
}
