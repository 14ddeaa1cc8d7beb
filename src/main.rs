use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use quizforge_server::{app_state::AppState, config::Config, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();
    if std::env::var("APP_ENV").as_deref() == Ok("production") {
        config.validate_for_production();
    }

    let host = config.web_server_host.clone();
    let port = config.web_server_port;
    let state = web::Data::new(AppState::new(config));

    log::info!("Starting quizforge server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .service(handlers::health_check)
            .service(handlers::generate_questions)
            .service(handlers::extract_questions)
            .service(handlers::generate_questions_from_file)
            .service(handlers::generate_title_description)
            .service(handlers::multi_agent_quiz)
            .service(handlers::get_draft)
            .service(handlers::reset_draft)
    })
    .bind((host, port))?
    .run()
    .await
}
