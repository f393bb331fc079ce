use list_signup::configuration::get_configuration;
use list_signup::startup::Application;
use list_signup::telemetry::get_subscriber;
use list_signup::telemetry::init_subscriber;

/// Initialise telemetry, load config, and start the server
#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // only logs at this level and higher are emitted, unless `RUST_LOG` says
    // otherwise
    let subscriber = get_subscriber("list-signup", "info", std::io::stdout);
    init_subscriber(subscriber)?;

    let cfg = get_configuration()?;

    let app = Application::build(cfg).await?;
    tracing::info!("listening on port {}", app.get_port());
    app.run_until_stopped().await?;

    Ok(())
}
