use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{App, HttpServer};
use env_logger::Env;
use urna::db::{get_db_pool, init_db};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_lib_mods();

    init_db(std::env::var("DATABASE_URL").expect("DATABASE_URL must be set.")).await;

    let db = get_db_pool();
    urna::db::migrate(db)
        .await
        .expect("Failed to run database migrations.");
    urna::db::seed_config(db, std::env::var("ADMIN_CODE").ok())
        .await
        .expect("Failed to seed configuration row.");

    let listen = urna::app_config::get().server.listen;
    log::info!("Listening on {}", listen);

    HttpServer::new(move || {
        App::new()
            // The browser UI is served from elsewhere; every JSON
            // response carries permissive CORS headers.
            .wrap(
                DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*"))
                    .add((
                        "Access-Control-Allow-Methods",
                        "GET, POST, PUT, DELETE, OPTIONS",
                    ))
                    .add(("Access-Control-Allow-Headers", "Content-Type, X-Admin-Code")),
            )
            .wrap(Logger::new("%a %{User-Agent}i"))
            .configure(urna::web::configure)
    })
    .bind(listen)?
    .run()
    .await
}

/// Initialize third party crates we rely on but don't have control over.
fn init_lib_mods() {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}
