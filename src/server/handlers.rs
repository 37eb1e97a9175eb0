use actix_web::http::header::ContentType;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::de::DeserializeOwned;

use super::{label, AppState, AUTH_TOKEN_HEADER};
use crate::error::{GatewayError, Result};
use crate::models::{
    GenerateRequest, GenerateResponse, LoginRequest, LoginResponse, PrintLabelQuery,
};
use crate::prompt::Answers;

/// Bodies are parsed by hand so authentication runs before body validation and an
/// absent body reads as `{}`.
fn parse_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| GatewayError::BadRequest(format!("Invalid JSON body: {}", e)))
}

pub async fn login(state: web::Data<AppState>, body: web::Bytes) -> Result<HttpResponse> {
    let request: LoginRequest = parse_body(&body)?;
    let grant = state.authenticator.login(
        request.sede.as_deref().unwrap_or_default(),
        request.password.as_deref().unwrap_or_default(),
    )?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        token: grant.token,
        counter: grant.counter,
    }))
}

/// Charges the sede before the answers are validated: a request with too few
/// answers still consumes one generation.
pub async fn generate(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let token = req
        .headers()
        .get(AUTH_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());
    let sede = state.authenticator.authenticate(token)?;
    let request: GenerateRequest = parse_body(&body)?;

    let remaining = state.quota.authorize_and_charge(&sede)?;

    let answers = Answers::try_from(request.respuestas.unwrap_or_default())?;
    let prompt = state.prompts.build(&answers);

    let outcome = state.generator.generate(&prompt).await.map_err(|e| {
        log::warn!(
            "Generation for sede '{}' failed, quota stays at {}",
            sede,
            remaining
        );
        e
    })?;

    log::info!(
        "Sede '{}' received image {} ({} generations left)",
        sede,
        outcome.primary_url(),
        remaining
    );

    let all_images = if state.generator.settings().num_images > 1 {
        Some(outcome.image_urls.clone())
    } else {
        None
    };

    Ok(HttpResponse::Ok().json(GenerateResponse {
        image_url: outcome.primary_url().to_string(),
        remaining,
        all_images,
    }))
}

pub async fn print_label(query: web::Query<PrintLabelQuery>) -> HttpResponse {
    match query
        .image
        .as_deref()
        .map(str::trim)
        .filter(|image| !image.is_empty())
    {
        Some(image_url) => HttpResponse::Ok()
            .content_type(ContentType::html())
            .body(label::render_label_page(image_url)),
        None => HttpResponse::BadRequest()
            .content_type(ContentType::plaintext())
            .body("Falta la URL de la imagen en el parámetro 'image'"),
    }
}
