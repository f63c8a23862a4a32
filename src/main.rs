use actix_web::{middleware, web, App, HttpServer};

use food_manager::config::Config;
use food_manager::db::{self, Store};
use food_manager::routes;

fn startup_error(err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(err.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(startup_error)?;

    // set up database connection pool
    let pool = db::establish_pool(&config.database_url, config.pool_size)
        .map_err(startup_error)?;
    {
        let mut conn = pool.get().map_err(startup_error)?;
        db::run_migrations(&mut conn).map_err(startup_error)?;
    }
    let store = Store::new(pool);

    let (host, port) = config.bind_address();
    log::info!("using database {}", config.database_url);
    log::info!("starting HTTP server at http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(store.clone()))
            .wrap(middleware::Logger::default())
            .configure(routes::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
