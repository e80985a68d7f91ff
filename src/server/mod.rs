pub mod routes;

use actix_web::{middleware::Logger, web, App, HttpServer};

use crate::{config::ServerConfig, error::HairgenError, generator::HairstyleGenerator};

pub use routes::{configure, static_files, AppState, MAX_IMAGE_SIZE};

pub async fn run(config: ServerConfig, generator: HairstyleGenerator) -> std::io::Result<()> {
    let state = web::Data::new(AppState::new(generator, config.index_file.clone()));
    let static_dir = config.static_dir.clone();

    if !static_dir.is_dir() {
        log::warn!(
            "⚠️  Static directory {} does not exist; /static will return 404",
            static_dir.display()
        );
    }

    log::info!(
        "🌐 Listening on http://{}:{} (open http://127.0.0.1:{}/ in a browser)",
        config.host,
        config.port,
        config.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Dms"))
            .app_data(state.clone())
            .configure(configure)
            .service(static_files(static_dir.clone()))
    })
    .bind((config.host.as_str(), config.port))
    .map_err(|e| {
        std::io::Error::new(
            e.kind(),
            HairgenError::ConfigError(format!(
                "cannot bind {}:{}: {}",
                config.host, config.port, e
            )),
        )
    })?
    .run()
    .await
}
