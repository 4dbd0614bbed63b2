use std::io;

use crm_service::config::Config;
use crm_service::{build_server, create_pool, run_migrations};
use dotenvy::dotenv;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(io::Error::other)?;
    let pool = create_pool(&config.database_url, config.pool_max_size).map_err(io::Error::other)?;
    run_migrations(&pool).map_err(io::Error::other)?;

    log::info!("Starting server at http://{}:{}", config.host, config.port);
    if config.graphiql {
        log::info!("GraphiQL available at http://{}:{}/graphql", config.host, config.port);
    }

    build_server(pool, &config)?.await
}
