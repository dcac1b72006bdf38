#[tokio::main]
async fn main() {
    if let Err(e) = collab_backend::run().await {
        eprintln!("collab-backend failed to start: {}", e);
        std::process::exit(1);
    }
}
