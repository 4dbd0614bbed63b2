pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod graphql;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::error::Error;
use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use application::crm_service::CrmService;
use config::Config;
use infrastructure::customer_repo::DieselCustomerRepository;
use infrastructure::order_repo::DieselOrderRepository;
use infrastructure::product_repo::DieselProductRepository;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    for version in applied {
        log::info!("applied migration {version}");
    }
    Ok(())
}

/// Use cases backed by the Postgres repositories.
pub fn postgres_service(pool: &DbPool) -> CrmService {
    CrmService::new(
        Arc::new(DieselCustomerRepository::new(pool.clone())),
        Arc::new(DieselProductRepository::new(pool.clone())),
        Arc::new(DieselOrderRepository::new(pool.clone())),
    )
}

/// Mounts `/graphql`; the schema must already be registered as app data.
pub fn configure_graphql(cfg: &mut web::ServiceConfig, graphiql: bool) {
    let mut resource = web::resource("/graphql").route(web::post().to(handlers::graphql::graphql));
    if graphiql {
        resource = resource.route(web::get().to(handlers::graphql::graphiql));
    }
    cfg.service(resource);
}

/// Build and return an actix-web `Server` bound to the configured address.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(pool: DbPool, config: &Config) -> std::io::Result<actix_web::dev::Server> {
    let schema = graphql::build_schema(postgres_service(&pool));
    let graphiql = config.graphiql;

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(schema.clone()))
            .wrap(Logger::default())
            .configure(|cfg| configure_graphql(cfg, graphiql))
            .route("/health", web::get().to(handlers::health::health))
    })
    .bind((config.host.clone(), config.port))?
    .run())
}
