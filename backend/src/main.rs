use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use std::sync::Arc;

use backend::config::{AppConfig, ModelConfig};
use backend::pipeline::model::{Classifier, ModelLoadError};
use backend::pipeline::Analyzer;
use backend::routes::configure_routes;

fn startup_error(context: &str, e: impl std::fmt::Display) -> std::io::Error {
    log::error!("{}: {}", context, e);
    std::io::Error::other(format!("{}: {}", context, e))
}

#[cfg(feature = "torch")]
fn load_classifier(config: &ModelConfig) -> Result<Arc<dyn Classifier>, ModelLoadError> {
    let classifier = backend::pipeline::model::TorchClassifier::load(config)?;
    Ok(Arc::new(classifier))
}

#[cfg(not(feature = "torch"))]
fn load_classifier(_config: &ModelConfig) -> Result<Arc<dyn Classifier>, ModelLoadError> {
    Err(ModelLoadError::RuntimeUnavailable)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::load().map_err(|e| startup_error("Invalid configuration", e))?;

    shared::advice::verify_catalog()
        .map_err(|e| startup_error("Label and advice tables disagree", e))?;

    log::info!(
        "Loading model from {} (device: {:?})",
        config.model.path.display(),
        config.model.device
    );
    let classifier =
        load_classifier(&config.model).map_err(|e| startup_error("Model loading failed", e))?;
    let analyzer = Analyzer::new(classifier);

    let upload_config = config.upload.clone();
    let static_dir = config.static_dir.clone();
    let bind_address = config.bind_address();

    log::info!("Serving static files from {}", static_dir.display());
    log::info!("Starting server on {}", bind_address);

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(analyzer.clone()))
            .app_data(web::Data::new(upload_config.clone()))
            .configure(|cfg| configure_routes(cfg, static_dir.clone()))
    });
    if let Some(workers) = config.server.workers {
        server = server.workers(workers);
    }

    server.bind(&bind_address)?.run().await
}
