pub mod handlers;
pub mod label;

use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::middleware::{from_fn, Next};
use actix_web::{web, App, Error, HttpServer};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::Authenticator;
use crate::config::Config;
use crate::leonardo::GenerationClient;
use crate::logger::Timer;
use crate::prompt::PromptBuilder;
use crate::quota::QuotaGate;
use crate::session::SessionStore;

/// Header carrying the session token on protected routes.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Everything a request handler needs, shared across workers.
#[derive(Clone)]
pub struct AppState {
    pub authenticator: Authenticator,
    pub quota: QuotaGate,
    pub prompts: PromptBuilder,
    pub generator: GenerationClient,
}

impl AppState {
    pub fn new(config: &Config, store: Arc<SessionStore>, generator: GenerationClient) -> Self {
        Self {
            authenticator: Authenticator::new(config.sites.clone(), store.clone()),
            quota: QuotaGate::new(store),
            prompts: PromptBuilder::new(config.prompt_style),
            generator,
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/login", web::post().to(handlers::login))
        .route("/generate", web::post().to(handlers::generate))
        .route("/print-label", web::get().to(handlers::print_label));
}

/// Browser access for the kiosk frontend, which is served from another origin.
pub fn cors(config: &Config) -> Cors {
    let cors = if config.allows_any_origin() {
        Cors::default().allow_any_origin()
    } else {
        config
            .cors_allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "POST"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
        .allowed_header(AUTH_TOKEN_HEADER)
        .max_age(3600)
}

/// Logs every request with a fresh request id, its status and how long it took.
pub async fn request_logger(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let request_id = Uuid::new_v4().simple().to_string();
    let mut timer = Timer::new(format!(
        "{} {} [req:{}]",
        req.method(),
        req.path(),
        &request_id[..8]
    ));

    let response = next.call(req).await?;
    timer.finish_with(response.status().as_u16());
    Ok(response)
}

pub async fn run(config: &Config, state: AppState) -> std::io::Result<()> {
    let data = web::Data::new(state);
    let app_config = config.clone();

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(cors(&app_config))
            .wrap(from_fn(request_logger))
            .configure(configure)
    })
    .bind((config.bind_address.as_str(), config.port))?
    .run()
    .await
}
