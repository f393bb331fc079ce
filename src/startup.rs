use std::net::TcpListener;

use actix_web::cookie::Key;
use actix_web::dev::Server;
use actix_web::web;
use actix_web::web::Data;
use actix_web::App;
use actix_web::HttpServer;
use actix_web_flash_messages::storage::CookieMessageStore;
use actix_web_flash_messages::FlashMessagesFramework;
use secrecy::ExposeSecret;
use secrecy::Secret;
use tracing_actix_web::TracingLogger;

use crate::configuration::MarketingSettings;
use crate::configuration::Settings;
use crate::routes::health_check;
use crate::routes::subscribe;
use crate::routes::subscription_form;

/// Wrapper for actix's `Server` with access to the bound port. Not to be
/// confused with actix's `App`!
pub struct Application {
    /// Left private; use `get_port` to access
    port: u16,
    server: Server,
}

impl Application {
    /// Bind the listener and build the shared HTTP client, then hand both to
    /// `run`
    pub async fn build(cfg: Settings) -> Result<Self, anyhow::Error> {
        let addr = format!("{}:{}", cfg.application.host, cfg.application.port);
        let listener = TcpListener::bind(addr)?;

        // port 0 means "pick any"; keep whatever the OS assigned
        let port = listener.local_addr()?.port();

        let http_client = cfg.marketing.http_client()?;

        let server = run(
            listener,
            cfg.marketing,
            http_client,
            cfg.application.hmac_secret,
        )?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 { self.port }

    /// Because this consumes `self`, this should be the final function call (or
    /// passed to `tokio::spawn`)
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> { self.server.await }
}

/// The server is not responsible for binding to an address, it only listens to
/// an already bound address.
///
/// Declares all endpoints:
/// - `GET /health_check`
/// - `GET /`: signup form
/// - `POST /subscriptions`: signup; any other method renders the form
pub fn run(
    listener: TcpListener,
    marketing: MarketingSettings,
    http_client: reqwest::Client,
    hmac_secret: Secret<String>,
) -> Result<Server, anyhow::Error> {
    // signs the flash message cookies; must be at least 64 bytes
    let secret_key = Key::try_from(hmac_secret.expose_secret().as_bytes())?;
    let cookie_store = CookieMessageStore::builder(secret_key).build();
    let msg_framework = FlashMessagesFramework::builder(cookie_store).build();

    // `Data` is an `Arc`: every worker gets a handle to the same settings and
    // connection pool. the `MarketingClient` itself is built per request
    let marketing = Data::new(marketing);
    let http_client = Data::new(http_client);

    // the closure is called once per worker (one per core)
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(msg_framework.clone())
            .route("/", web::get().to(subscription_form))
            .route("/health_check", web::get().to(health_check))
            .service(
                web::resource("/subscriptions")
                    .route(web::post().to(subscribe))
                    // no guard: matches every remaining method
                    .route(web::route().to(subscription_form)),
            )
            .app_data(marketing.clone())
            .app_data(http_client.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
