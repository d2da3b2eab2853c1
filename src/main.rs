use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use teamtrek_backend::{
    challenge::Challenge,
    config::Config,
    database::{create_pool, run_migrations},
    external::SlackService,
    handlers,
    middlewares::create_cors,
    services::*,
    swagger::swagger_config,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration file");

    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let challenge =
        Challenge::from_config(&config.challenge).expect("Invalid challenge configuration");
    log::info!(
        "Challenge window {} to {}, {} weeks",
        challenge.start_date(),
        challenge.end_date(),
        challenge.weeks()
    );

    let slack_service = SlackService::new(config.slack.clone());

    let stats_service = StatsService::new(pool.clone(), challenge.clone());
    let qualification_service =
        QualificationService::new(pool.clone(), challenge.clone(), slack_service.clone());
    let milestone_service =
        MilestoneService::new(pool.clone(), challenge.clone(), slack_service.clone());
    let raffle_service =
        RaffleService::new(pool.clone(), challenge.clone(), slack_service.clone());
    let roster_service = RosterService::new(pool.clone(), challenge.clone());
    let activity_service = ActivityService::new(
        pool.clone(),
        challenge.clone(),
        qualification_service.clone(),
        milestone_service.clone(),
        slack_service.clone(),
    );

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .app_data(web::Data::new(activity_service.clone()))
            .app_data(web::Data::new(roster_service.clone()))
            .app_data(web::Data::new(raffle_service.clone()))
            .app_data(web::Data::new(milestone_service.clone()))
            .app_data(web::Data::new(stats_service.clone()))
            .app_data(web::Data::new(slack_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::activity_config)
                    .configure(handlers::roster_config)
                    .configure(handlers::prize_config)
                    .configure(handlers::milestone_config)
                    .configure(handlers::digest_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
