use hairgen::{logger, Config, HairstyleGenerator, PromptRegistry, ReplicateClient};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    logger::init()?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let config = Config::from_env();
    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), &config);

    let client = match ReplicateClient::new(&config.replicate) {
        Ok(client) => client,
        Err(e) => {
            log::error!("❌ Failed to initialize Replicate client: {}", e);
            return Err(e.into());
        }
    };

    let registry = PromptRegistry::builtin();
    log::info!("💇 {} hairstyles available:", registry.len());
    for key in registry.keys() {
        log::info!("   {}", key);
    }

    let generator = HairstyleGenerator::new(registry, Arc::new(client), config.replicate.model.clone());

    hairgen::server::run(config.server, generator).await?;

    log::info!("👋 Server stopped");
    Ok(())
}
