//! Sede gateway: site login, per-site generation quota and a polling client for
//! the Leonardo image generation API, served over actix-web.

pub mod auth;
pub mod config;
pub mod error;
pub mod leonardo;
pub mod logger;
pub mod models;
pub mod prompt;
pub mod quota;
pub mod server;
pub mod session;

pub use auth::{Authenticator, LoginGrant};
pub use config::{Config, GenerationSettings, LeonardoConfig, PollingConfig};
pub use error::{GatewayError, Result};
pub use leonardo::{
    GenerationClient, GenerationOutcome, GenerationProvider, JobStatus, LeonardoClient, Sleeper,
    TokioSleeper,
};
pub use prompt::{Answers, PromptBuilder, PromptStyle, RenderedPrompt};
pub use quota::QuotaGate;
pub use server::AppState;
pub use session::SessionStore;
