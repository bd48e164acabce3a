//! # homelited — homelite daemon
//!
//! Composition root that wires all adapters together and starts the hub.
//!
//! ## Responsibilities
//! - Load configuration (TOML file + env overrides) once at startup
//! - Initialize tracing
//! - Load the persisted device set and build the registry
//! - Resolve the Bluetooth strategy (single probe, never re-probed)
//! - Optionally connect the MQTT backend
//! - Start the discovery scheduler when enabled
//! - Serve the axum router and shut everything down cooperatively on SIGINT
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no device logic belongs here.

mod config;

use std::sync::Arc;
use std::time::Duration;

use homelite_adapter_bluetooth::BluetoothBackend;
use homelite_adapter_http_axum::state::AppState;
use homelite_adapter_mqtt::MqttBackend;
use homelite_adapter_storage_json::JsonDeviceStore;
use homelite_adapter_virtual::VirtualBackend;
use homelite_app::discovery::DiscoveryScheduler;
use homelite_app::dispatcher::ActionDispatcher;
use homelite_app::registry::DeviceRegistry;

use config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.logging.filter))
        .init();

    // Persistence + registry
    let store = JsonDeviceStore::new(&config.storage.path);
    let registry = Arc::new(DeviceRegistry::load(store).await?);

    // Bluetooth strategy is resolved here, once.
    let bluetooth = Arc::new(BluetoothBackend::init(&config.bluetooth).await?);

    // Optional MQTT backend
    let (mqtt, mqtt_task) = if config.mqtt.enabled {
        let (backend, task) = MqttBackend::connect(&config.mqtt);
        (Some(Arc::new(backend)), Some(task))
    } else {
        (None, None)
    };

    let dispatcher = Arc::new(ActionDispatcher::new(
        Arc::clone(&registry),
        Some(Arc::clone(&bluetooth)),
        mqtt.clone(),
        Some(VirtualBackend),
    ));

    let scheduler = if config.discovery.enabled {
        Some(DiscoveryScheduler::start(
            Arc::clone(&registry),
            Arc::clone(&bluetooth),
            Duration::from_secs(config.discovery.interval_secs),
        ))
    } else {
        tracing::info!("background discovery disabled");
        None
    };

    let state = AppState::new(
        Arc::clone(&registry),
        dispatcher,
        Some(Arc::clone(&bluetooth)),
    );
    let app = homelite_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    tracing::info!(%bind_addr, "homelited listening");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(scheduler) = scheduler {
        scheduler.stop().await;
    }
    if let Some(mqtt) = &mqtt {
        mqtt.shutdown().await;
    }
    if let Some(task) = mqtt_task {
        task.abort();
    }

    tracing::info!("homelited stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}
