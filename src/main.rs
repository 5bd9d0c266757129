use actix_cors::Cors;
use actix_web::{web, App, HttpServer, middleware::{Logger, DefaultHeaders}, cookie::Key};
use actix_session::{SessionMiddleware, storage::CookieSessionStore, SessionExt};
use tera::Tera;
use wilky_backend::{
    config::Config,
    content::TitleResolver,
    routes,
    middleware::user_guard,
    AppState
};
use redb::Database;
use r2d2_sqlite::SqliteConnectionManager;
use r2d2::Pool;
use std::fs;
use clap::Parser;
use std::path::PathBuf;
use hex;
use std::convert::TryFrom;

#[derive(Parser, Debug)]
#[command(name = "wilky_server", author, version, about = "Starts the Wilky web server.")]
struct Cli {
    /// Path to the .env configuration file.
    #[arg(long, required = true, value_name = "FILE")]
    env_file: PathBuf,
}

fn build_cors(allowed_origins: &str) -> Cors {
    let methods = vec!["GET", "POST", "PUT", "DELETE"];
    let headers = vec![
        actix_web::http::header::AUTHORIZATION,
        actix_web::http::header::ACCEPT,
        actix_web::http::header::CONTENT_TYPE,
    ];
    let cors = if allowed_origins.trim() == "*" {
        Cors::default().allow_any_origin()
    } else {
        allowed_origins
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };
    cors.allowed_methods(methods)
        .allowed_headers(headers)
        .supports_credentials()
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env(&cli.env_file)
        .expect("FATAL: Failed to load or parse configuration.");

    env_logger::init_from_env(env_logger::Env::new().default_filter_or(&config.log_level));

    let tera = Tera::new("templates/**/*.html").expect("Tera initialization failed");

    fs::create_dir_all(&config.database_path)
        .expect("Failed to create database directory");
    fs::create_dir_all(&config.media_path)
        .expect("Failed to create media directory");

    let redb_db_data = web::Data::new(Database::open(&config.posts_db_path())
        .expect("FATAL: posts.db not found. Run 'cargo run --bin setup_cli -- --env-file <path> db setup'"));

    let manager = SqliteConnectionManager::file(config.users_db_path());
    let pool = Pool::builder()
        .build(manager)
        .expect("FATAL: Failed to create Rusqlite connection pool.");

    let app_state = web::Data::new(AppState {
        title_resolver: TitleResolver::new(&config.title_lookup_endpoint, config.title_lookup_timeout()),
    });

    let session_key_bytes = hex::decode(&config.session_secret_key)
        .expect("FATAL: SESSION_SECRET_KEY in .env is not a valid hex string.");
    let session_key = Key::try_from(session_key_bytes.as_slice())
        .expect("FATAL: The decoded SESSION_SECRET_KEY is not long enough (minimum 64 bytes required).");

    let server_address = format!("{}:{}", config.web.host, config.web.port);
    log::info!("Wilky server starting at http://{}", server_address);

    HttpServer::new(move || {
        let session_mw = SessionMiddleware::builder(CookieSessionStore::default(), session_key.clone())
            .cookie_secure(config.use_secure_cookies)
            .cookie_http_only(true)
            .cookie_same_site(actix_web::cookie::SameSite::Lax)
            .build();

        App::new()
            .wrap(session_mw)
            .wrap(build_cors(&config.allowed_origins))
            .wrap(Logger::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("X-Frame-Options", "DENY"))
            )
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(tera.clone()))
            .app_data(redb_db_data.clone())
            .app_data(web::Data::new(pool.clone()))
            .app_data(app_state.clone())

            .configure(routes::public::config_api)
            .configure(routes::auth::config_auth)
            .service(
                web::scope("/dashboard")
                    .guard(actix_web::guard::fn_guard(|ctx| user_guard(&ctx.get_session())))
                    .configure(routes::dashboard::config_dashboard)
            )
            .service(actix_files::Files::new("/media", &config.media_path))
            .configure(routes::public::config_pages)
    })
    .bind(server_address)?
    .run()
    .await
}
