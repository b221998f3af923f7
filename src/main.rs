#[tokio::main]
async fn main() {
    if let Err(e) = skirmish::run_with_config().await {
        eprintln!("relay exited: {e}");
        std::process::exit(1);
    }
}
