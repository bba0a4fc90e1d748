pub mod config;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::services::{
    bot_client::BotApi, invoice_service::InvoiceService, payment_service::PaymentService,
    polling_service::PollingService, update_service::UpdateService,
};

#[derive(Clone)]
pub struct AppState {
    pub bot_token: Arc<str>,
    pub invoice_service: InvoiceService,
}

impl AppState {
    pub fn new(config: &Config, bot: Arc<dyn BotApi>) -> Self {
        Self {
            bot_token: Arc::from(config.bot_token.as_str()),
            invoice_service: InvoiceService::new(bot, config.allowed_amounts.clone()),
        }
    }
}

/// HTTP front door: the invoice endpoint behind the CORS and trace layers.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/invoice",
            get(routes::invoice::create_invoice).options(routes::invoice::preflight),
        )
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::cors::cors_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Long-poll loop wired to the payment and `/start` handlers.
pub fn poller(config: &Config, bot: Arc<dyn BotApi>) -> PollingService {
    let updates = UpdateService::new(
        bot.clone(),
        PaymentService::new(bot.clone()),
        config.mini_app_url.clone(),
        config.mini_app_button.clone(),
    );
    PollingService::new(bot, updates, config.poll_timeout_secs)
}
