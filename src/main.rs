use std::sync::Arc;

use tokio::net::TcpListener;

use pagewiki::logger::Logger;
use pagewiki::{router, AppState, Config, Templates, WikiError};

#[tokio::main]
async fn main() -> Result<(), WikiError> {
    if let Err(e) = Logger::init() {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let config = Config::default();
    log::info!("Starting...");

    // A broken template set is fatal before we accept any request
    let templates = Templates::load(&config.template_dir)?;
    let state = AppState {
        root_dir: Arc::clone(&config.root_dir),
        templates: Arc::new(templates),
    };
    let app = router(state);

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr).await?;
    log::info!("Listening on {}...", addr);
    axum::serve(listener, app).await.map_err(WikiError::from)
}
