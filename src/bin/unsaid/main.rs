use actix_web::http::header;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use env_logger::Env;
use std::sync::Arc;
use unsaid::app_config::AppConfig;
use unsaid::moderation::ModerationRules;
use unsaid::permission::{AdminAllowlist, AuthorizationPolicy};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_lib_mods();

    let config = AppConfig::load()?;
    let db = unsaid::db::connect(&config.database.url).await?;
    unsaid::db::create_schema(&db).await?;

    let rules = ModerationRules::from_config(&config.moderation);
    let policy: Arc<dyn AuthorizationPolicy> =
        Arc::new(AdminAllowlist::from_config(&config.admin));
    if config.admin.uids.is_empty() {
        log::warn!("No administrator uids configured; admin endpoints will refuse every caller.");
    }

    let bind = config.server.bind.clone();
    log::info!("Listening on {}", bind);

    HttpServer::new(move || {
        // Order of middleware IS IMPORTANT and is in REVERSE EXECUTION ORDER.
        App::new()
            .app_data(Data::new(db.clone()))
            .app_data(Data::new(rules.clone()))
            .app_data(Data::new(config.clone()))
            .app_data(Data::new(policy.clone()))
            .wrap(
                DefaultHeaders::new()
                    .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
                    .add(("Referrer-Policy", "no-referrer")),
            )
            .wrap(Logger::new("%r %s %Dms"))
            .configure(unsaid::web::configure)
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}

/// Initialize third party crates we rely on but don't have control over.
fn init_lib_mods() {
    // A missing .env is fine; the environment may already be set.
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}
