#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    if let Err(e) = access_control_backend::run().await {
        eprintln!("access-control-backend failed to start: {e}");
        std::process::exit(1);
    }
}
