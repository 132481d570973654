//! Orchestrator (spec §4.7): parses the CLI, brings up the bus, repository,
//! manager, admin surface and every configured plugin, waits for a
//! shutdown signal, and tears everything down in reverse order.

mod plugins;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use vessel_ais::Zone;
use vessel_bus::Bus;
use vessel_config::ConfigManager;
use vessel_manager::{ManagerConfig, VesselManager};
use vessel_plugin::{PluginCategory, PluginConfig, PluginContext, Registry};
use vessel_repository::Repository;

/// Vessel Frame: AIS ingestion daemon, vessel tracker and e-paper display
/// driver.
#[derive(Parser, Debug)]
#[command(name = "vessel-frame", about = "AIS ingestion daemon, vessel tracker and display driver")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Path to the SQLite vessel database.
    #[arg(long, default_value = "db.sqlite")]
    db: PathBuf,

    /// Log verbosity.
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Path to the rotating log file.
    #[arg(long, default_value = "vessel_frame.log")]
    log_path: PathBuf,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
#[value(rename_all = "UPPER")]
enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warning => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// Console + rotating file logging (spec §4.7's "initialize logging
/// (console + rotating file)"), following the teacher's layered
/// `tracing-subscriber` setup. Returns the file appender's guard, which
/// must be held for the process lifetime or buffered writes are lost.
fn init_tracing(level: Level, log_path: &PathBuf) -> anyhow::Result<tracing_appender::non_blocking::WorkerGuard> {
    let directory = log_path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| std::path::Path::new("."));
    let file_name = log_path.file_name().unwrap_or_else(|| std::ffi::OsStr::new("vessel_frame.log"));
    std::fs::create_dir_all(directory)?;

    let file_appender = tracing_appender::rolling::daily(directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let console_layer = fmt::layer().with_target(false);
    let file_layer = fmt::layer().with_target(false).with_ansi(false).with_writer(non_blocking);

    tracing_subscriber::registry().with(env_filter).with(console_layer).with(file_layer).try_init()?;

    Ok(guard)
}

/// Convert a plugin's `[plugin_name]` config table into a [`PluginConfig`].
fn plugin_config(config: &ConfigManager, name: &str) -> PluginConfig {
    match config.get(name, toml::Value::Table(toml::Table::new())) {
        toml::Value::Table(table) => PluginConfig::new(table),
        _ => PluginConfig::default(),
    }
}

fn configured_names(config: &ConfigManager, dotted_path: &str) -> Vec<String> {
    match config.get(dotted_path, toml::Value::Array(vec![])) {
        toml::Value::Array(items) => items.into_iter().filter_map(|v| v.as_str().map(str::to_string)).collect(),
        _ => Vec::new(),
    }
}

/// Construct every source/processor/controller plugin in `category`,
/// starting each one. A construction or startup failure is logged and that
/// plugin is simply omitted from the running set (spec §7: "errors in one
/// plugin are logged and the remaining plugins continue").
async fn start_plugin_category(
    registry: &Registry,
    category: PluginCategory,
    names: &[String],
    context: &PluginContext,
    config: &ConfigManager,
) -> Vec<Box<dyn vessel_plugin::Plugin>> {
    let mut started = Vec::new();
    for name in names {
        let plugin_cfg = plugin_config(config, name);
        match registry.create_plugin(category, name, context, &plugin_cfg) {
            Ok(plugin) => {
                if let Err(error) = plugin.start().await {
                    tracing::error!(%category, %name, %error, "plugin failed to start");
                    continue;
                }
                tracing::info!(%category, %name, "plugin started");
                started.push(plugin);
            }
            Err(error) => {
                tracing::error!(%category, %name, %error, "plugin construction failed");
            }
        }
    }
    started
}

async fn stop_all(plugins: Vec<Box<dyn vessel_plugin::Plugin>>) {
    for plugin in plugins.into_iter().rev() {
        if let Err(error) = plugin.stop().await {
            tracing::error!(%error, "error stopping plugin");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _log_guard = init_tracing(args.log_level.into(), &args.log_path)?;

    tracing::info!(config = %args.config.display(), db = %args.db.display(), "starting vessel-frame");

    // Fatal startup errors (malformed config, unopenable database) abort
    // with no partial startup (spec §7).
    let config = Arc::new(ConfigManager::new(args.config.clone()));
    config.load()?;

    if let Some(parent) = args.db.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let bus = Bus::new();
    let repository = Arc::new(Repository::start(args.db.clone()).await?);

    let max_tracked = config.get_typed::<usize>("SYSTEM.max_tracked").unwrap_or(50);
    let zones = config.get_typed::<Vec<Zone>>("SYSTEM.zones").unwrap_or_default();
    let manager = Arc::new(VesselManager::new(
        bus.clone(),
        repository.clone(),
        ManagerConfig {
            in_topic: vessel_ais::topics::AIS_DECODED.to_string(),
            max_tracked,
            zones,
        },
    ));
    manager.start();
    tracing::info!(max_tracked, "vessel manager started");

    // Admin HTTP surface: a supervised side task whose failure must not
    // stop the data pipeline (spec §4.7).
    let admin_shutdown = CancellationToken::new();
    let admin_addr: SocketAddr = config
        .get_typed::<String>("SYSTEM.admin_addr")
        .unwrap_or_else(|| "127.0.0.1:8080".to_string())
        .parse()
        .unwrap_or_else(|_| SocketAddr::from((std::net::IpAddr::from([127, 0, 0, 1]), 8080)));
    let admin_state = vessel_admin::AdminState {
        manager: manager.clone(),
        config: config.clone(),
    };
    let admin_task = tokio::spawn({
        let shutdown = admin_shutdown.clone();
        async move {
            if let Err(error) = vessel_admin::serve(admin_addr, admin_state, shutdown).await {
                tracing::error!(%error, "admin surface crashed, data pipeline unaffected");
            }
        }
    });

    let registry = Registry::new();
    let mut context = PluginContext::new(bus.clone(), manager.clone());

    let renderer_names = configured_names(&config, "plugins.renderer");
    let renderer = match renderer_names.first() {
        Some(name) => {
            let plugin_cfg = plugin_config(&config, name);
            match registry.create_renderer(name, &context, &plugin_cfg) {
                Ok(renderer) => {
                    let renderer: Arc<dyn vessel_plugin::Renderer> = Arc::from(renderer);
                    context = context.with_renderer(renderer.clone());
                    Some(renderer)
                }
                Err(error) => {
                    tracing::error!(%name, %error, "renderer construction failed, screens will be skipped");
                    None
                }
            }
        }
        None => None,
    };

    let sources = start_plugin_category(&registry, PluginCategory::Source, &configured_names(&config, "plugins.sources"), &context, &config).await;
    let processors = start_plugin_category(&registry, PluginCategory::Processor, &configured_names(&config, "plugins.processors"), &context, &config).await;
    let controllers = start_plugin_category(&registry, PluginCategory::Controller, &configured_names(&config, "plugins.controllers"), &context, &config).await;

    let screen_names = configured_names(&config, "plugins.screens");
    let coordinator = if renderer.is_some() {
        let mut screens = Vec::new();
        for name in &screen_names {
            let plugin_cfg = plugin_config(&config, name);
            match registry.create_screen(name, &context, &plugin_cfg) {
                Ok(screen) => screens.push(screen),
                Err(error) => tracing::error!(%name, %error, "screen construction failed"),
            }
        }
        let coordinator = Arc::new(vessel_screen::ScreenCoordinator::new(bus.clone(), screens));
        if let Err(error) = coordinator.start().await {
            tracing::error!(%error, "screen coordinator failed to start");
        }
        Some(coordinator)
    } else {
        if !screen_names.is_empty() {
            tracing::warn!(screens = ?screen_names, "no renderer configured, skipping screen setup");
        }
        None
    };

    tracing::info!("vessel-frame running, awaiting shutdown signal");
    wait_for_shutdown_signal().await;
    tracing::info!("shutdown signal received, tearing down");

    // Reverse order of construction (spec §4.7).
    if let Some(coordinator) = coordinator {
        coordinator.stop().await;
    }
    stop_all(controllers).await;
    stop_all(processors).await;
    stop_all(sources).await;

    admin_shutdown.cancel();
    let _ = admin_task.await;

    manager.stop().await;
    repository.stop().await;
    bus.shutdown();

    tracing::info!("vessel-frame stopped cleanly");
    Ok(())
}

/// Waits for `SIGINT` or (on non-Windows platforms) `SIGTERM` (spec §6).
#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
