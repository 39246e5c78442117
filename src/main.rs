use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use virtual_accessory_bridge::catalog::{DelegateFactory, DeviceKind};
use virtual_accessory_bridge::config::{Config, load_dotenv};
use virtual_accessory_bridge::host::DeviceCache;
use virtual_accessory_bridge::platform::Platform;
use virtual_accessory_bridge::registry::Exposure;
use virtual_accessory_bridge::streaming::{LoggingDelegate, StreamingDelegate};

#[derive(Parser)]
#[command(name = "virtual-accessory-bridge")]
#[command(about = "Expose runtime-managed virtual accessories to a home-automation bridge")]
struct Cli {
    /// Optional .env file loaded before reading the environment
    #[arg(long, env = "BRIDGE_DOTENV", default_value = ".env")]
    dotenv: PathBuf,

    /// Exposure mode: static, dynamic or external
    #[arg(long)]
    exposure: Option<String>,

    /// Device names for static and external modes
    #[arg(long, value_delimiter = ',')]
    devices: Vec<String>,

    /// Kind of device created: switch, lightbulb or camera
    #[arg(long)]
    device_kind: Option<DeviceKind>,

    /// Trigger listener port
    #[arg(long)]
    port: Option<u16>,

    /// Device cache file
    #[arg(long)]
    cache_path: Option<PathBuf>,

    /// Concurrent camera streams advertised
    #[arg(long)]
    stream_count: Option<u8>,
}

impl Cli {
    fn apply(self, config: &mut Config) {
        if let Some(mode) = self.exposure {
            match Exposure::from_mode(&mode, self.devices) {
                Some(exposure) => config.platform.exposure = exposure,
                None => log::warn!("Ignoring unknown --exposure: {}", mode),
            }
        } else if !self.devices.is_empty() {
            match &mut config.platform.exposure {
                Exposure::StaticSet { names } | Exposure::ExternallyPublished { names } => {
                    *names = self.devices
                }
                Exposure::DynamicSet => log::warn!("--devices has no effect in dynamic mode"),
            }
        }
        if let Some(kind) = self.device_kind {
            config.platform.device_kind = kind;
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(path) = self.cache_path {
            config.cache.path = path;
        }
        if let Some(count) = self.stream_count {
            config.streaming.stream_count = count;
        }
    }
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    let cli = Cli::parse();
    // Environment is only modified here, before the runtime spawns its workers
    load_dotenv(&cli.dotenv);
    init_logger();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    };

    if !runtime.block_on(run(cli)) {
        std::process::exit(1);
    }
}

/// Returns false when the bridge stopped because of an error.
async fn run(cli: Cli) -> bool {
    info!("Starting Virtual Accessory Bridge");

    let mut config = Config::from_env();
    cli.apply(&mut config);
    info!("Configuration loaded:");
    info!("  Platform: {}", config.platform.name);
    info!("  Exposure: {:?}", config.platform.exposure);
    info!("  Device kind: {}", config.platform.device_kind);
    info!("  Trigger listener: {}", config.listener.socket_addr());
    info!("  Device cache: {:?}", config.cache.path);

    let cache = Arc::new(DeviceCache::new(config.cache.path.clone()));
    let delegates: DelegateFactory =
        Arc::new(|name: &str| Arc::new(LoggingDelegate::new(name)) as Arc<dyn StreamingDelegate>);
    let platform = Platform::new(&config, cache.clone(), delegates);

    if let Err(e) = platform.configure_cached(cache.snapshots()) {
        error!("Failed to restore cached accessories: {}", e);
        return false;
    }

    let shutdown = CancellationToken::new();
    let listener = match platform.did_finish_launching(shutdown.clone()).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to launch platform: {}", e);
            return false;
        }
    };

    info!("Virtual Accessory Bridge is running");
    info!("  - {} accessories", platform.registry().len());
    info!("  - Press Ctrl+C to exit");

    // Wait for shutdown signal, or for the trigger listener to die
    let clean = match listener {
        Some(mut handle) => tokio::select! {
            signal = signal::ctrl_c() => {
                log_shutdown_signal(signal);
                shutdown.cancel();
                listener_exit(handle.await)
            }
            result = &mut handle => {
                error!("Trigger listener exited unexpectedly");
                listener_exit(result);
                false
            }
        },
        None => {
            log_shutdown_signal(signal::ctrl_c().await);
            true
        }
    };

    // Externally published accessories are never cached
    if !matches!(config.platform.exposure, Exposure::ExternallyPublished { .. }) {
        cache.sync(platform.registry().snapshots());
    }

    info!("Virtual Accessory Bridge stopped");
    clean
}

fn log_shutdown_signal(signal: std::io::Result<()>) {
    match signal {
        Ok(()) => {
            info!("Received shutdown signal");
        }
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
        }
    }
}

/// Log how the listener task ended. Returns true for a clean stop.
fn listener_exit(
    result: Result<virtual_accessory_bridge::Result<()>, tokio::task::JoinError>,
) -> bool {
    match result {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            error!("Trigger listener error: {}", e);
            false
        }
        Err(e) => {
            error!("Trigger listener task failed: {}", e);
            false
        }
    }
}
