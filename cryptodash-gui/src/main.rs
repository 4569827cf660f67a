mod app;

use cryptodash_core::Dashboard;

fn init_logging() {
    // Initialize tracing with configurable filtering
    tracing_subscriber::fmt()
        .with_env_filter(
            // Default to info level, but allow override via RUST_LOG
            // Example: RUST_LOG=cryptodash_core::controller=debug
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cryptodash_core=info,cryptodash_gui=info".into()),
        )
        .init();
}

fn main() -> iced::Result {
    dotenvy::dotenv().ok();
    init_logging();

    let dashboard = match Dashboard::from_env() {
        Ok(dashboard) => dashboard,
        Err(e) => {
            eprintln!("Failed to configure dashboard: {}", e);
            std::process::exit(1);
        }
    };

    iced::application("CryptoDash", app::update, app::view)
        .run_with(move || app::initialize(dashboard))
}
