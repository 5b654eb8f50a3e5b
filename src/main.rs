use tracing::{error, info};

use video_batch_downloader::{core::config::AppConfig, utils::logging, web};

#[tokio::main]
async fn main() {
    logging::init_tracing();

    info!(
        "🚀 Starting {} v{}",
        video_batch_downloader::NAME,
        video_batch_downloader::VERSION
    );

    let config = AppConfig::load_or_default();

    if let Err(e) = web::run_server(config).await {
        error!("❌ Server stopped: {}", e);
        std::process::exit(1);
    }
}
