mod app_state;
mod cli;
mod launch;

use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::EnvFilter;
use winit::event_loop::EventLoop;

use app_state::{HostPaths, StreamHost};
use stream_config::schema::StreamConfig;

fn main() {
    // Parse CLI arguments
    let args = cli::parse();

    // Load config before logging so its level can seed the filter
    let loaded = match &args.config {
        Some(path) => stream_config::load_config_from(path),
        None => stream_config::load_config(),
    };
    let (config, config_error) = match loaded {
        Ok(config) => (config, None),
        Err(e) => (StreamConfig::default(), Some(e)),
    };

    // Initialize logging
    let fallback = config.logging.level.directive();
    let log_directive = match args.log_level.as_deref() {
        Some(level) if !level.contains('=') => format!("stream={level}"),
        Some(directive) => directive.to_string(),
        None => fallback.to_string(),
    };
    let directive: Directive = log_directive
        .parse()
        .or_else(|_| fallback.parse())
        .unwrap_or_else(|_| LevelFilter::INFO.into());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .init();

    tracing::info!("Stream host v{} starting...", env!("CARGO_PKG_VERSION"));
    match config_error {
        Some(e) => tracing::warn!("Config load failed, using defaults: {e}"),
        None => tracing::info!(url = %config.widget_url(), "Config loaded"),
    }

    let paths = HostPaths {
        launch_data: args.launch_data,
        import_flow: args.import_flow,
        export_flow: args.export_flow,
    };

    // Create event loop and run
    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            tracing::error!("Failed to create event loop: {e}");
            std::process::exit(1);
        }
    };
    let mut app = StreamHost::new(config, paths);

    tracing::info!("Entering event loop");
    if let Err(e) = event_loop.run_app(&mut app) {
        tracing::error!("Event loop error: {e}");
    }
    tracing::info!("Shutdown complete");
}
