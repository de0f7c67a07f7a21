//! Emporium JSON API Server

use std::{process, sync::Arc};

use salvo::{
    affix_state::inject,
    catcher::Catcher,
    oapi::{
        OpenApi,
        security::{Http, HttpAuthScheme, SecurityScheme},
        swagger_ui::SwaggerUi,
    },
    prelude::*,
    trailing_slash::remove_slash,
};
use tracing::{error, info};

use emporium_app::{
    auth::TokenVerifier,
    context::AppContext,
    payments::{StripeConfig, StripeGateway, webhook::WebhookVerifier},
};

use crate::{config::ServerConfig, observability::Observability, state::State};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod admin;
mod auth;
mod carts;
mod config;
mod envelope;
mod extensions;
mod healthcheck;
mod observability;
mod orders;
mod payments;
mod products;
mod router;
mod shutdown;
mod state;
#[cfg(test)]
mod test_helpers;
mod users;
mod wishlists;

/// Emporium JSON API Server entry point
#[tokio::main]
pub async fn main() {
    // Load configuration from .env and CLI arguments
    let config = ServerConfig::load().unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for config errors"
        )]
        {
            eprintln!("Configuration error: {e}");
        }

        process::exit(1);
    });

    let observability = Observability::init(&config).unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialize, must use eprintln"
        )]
        {
            eprintln!("Observability error: {e}");
        }

        process::exit(1);
    });

    let verifier = match TokenVerifier::new(config.auth.auth_token_pepper.as_bytes()) {
        Ok(verifier) => verifier,
        Err(verifier_error) => {
            error!("invalid token pepper: {verifier_error}");

            process::exit(1);
        }
    };

    let webhook = match WebhookVerifier::new(config.payments.stripe_webhook_secret.as_bytes()) {
        Ok(webhook) => webhook,
        Err(webhook_error) => {
            error!("invalid stripe webhook secret: {webhook_error}");

            process::exit(1);
        }
    };

    let gateway = match StripeGateway::new(StripeConfig {
        api_base: config.payments.stripe_api_base.clone(),
        secret_key: config.payments.stripe_secret_key.clone(),
        timeout: config.payments.timeout(),
    }) {
        Ok(gateway) => gateway,
        Err(gateway_error) => {
            error!("failed to build payment gateway client: {gateway_error}");

            process::exit(1);
        }
    };

    let app = match AppContext::from_database_url(
        &config.database.database_url,
        verifier,
        Arc::new(gateway),
        &config.payments.payment_currency,
    )
    .await
    {
        Ok(app) => app,
        Err(init_error) => {
            error!("failed to initialize app context: {init_error}");

            process::exit(1);
        }
    };

    let addr = config.socket_addr();

    info!("Starting server on {addr}");

    // Bind server
    let listener = TcpListener::new(addr).bind().await;

    let router = Router::new()
        .hoop(CatchPanic::new())
        .hoop(remove_slash())
        .hoop(inject(State::shared(app, webhook)))
        .hoop(observability::request_logging)
        .push(router::app_router());

    let doc = OpenApi::new("Emporium API", env!("CARGO_PKG_VERSION"))
        .add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
        .merge_router(&router);

    let router = router
        .push(doc.into_router("/api-doc/openapi.json"))
        .push(SwaggerUi::new("/api-doc/openapi.json").into_router("docs"));

    let service = Service::new(router).catcher(Catcher::default().hoop(envelope::envelope_errors));

    let server = Server::new(listener);

    let handle = server.handle();
    let grace = config.server.shutdown_grace();

    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(handle, grace).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    // Start serving requests
    server.serve(service).await;

    observability.shutdown();
}
