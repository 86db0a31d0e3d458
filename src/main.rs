use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use unipad::{handler, Channel, Engine, EngineConfig, Event, FrameLoop, FrameSettings};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    setup()?;

    // Optional first argument overrides the config location
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(EngineConfig::default_path);
    let config = EngineConfig::load(&config_path)
        .map_err(|e| eyre!("Failed to load {}: {}", config_path.display(), e))?;

    let mut engine = Engine::new(&config)?;
    if !engine.init() {
        warn!("No controller input available on this host, running idle");
    }
    bind_logging(&mut engine);

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl-C received, shutting down"),
            Err(e) => error!("Unable to listen for Ctrl-C: {}", e),
        }
        ctrl_c.cancel();
    });

    let stopped = FrameLoop::create(engine, Some(FrameSettings::from(&config)), cancel)
        .start()
        .run_until_cancelled()
        .await;

    info!(
        "Stopped after {} frames with {} controllers connected",
        stopped.total_frames(),
        stopped.engine().count()
    );
    Ok(())
}

fn bind_logging(engine: &mut Engine) {
    engine
        .bind(
            Channel::Connected,
            handler(|event| {
                if let Event::Connected(controller) = event {
                    info!(
                        "[{}] connected: {} ({})",
                        controller.slot(),
                        controller.name(),
                        controller.kind()
                    );
                }
                Ok(())
            }),
        )
        .bind(
            Channel::Disconnected,
            handler(|event| {
                if let Event::Disconnected(device) = event {
                    info!("[{}] disconnected: {}", device.slot, device.name);
                }
                Ok(())
            }),
        )
        .bind(
            Channel::Unsupported,
            handler(|event| {
                if let Event::Unsupported(device) = event {
                    warn!("[{}] unsupported: {}", device.slot, device.name);
                }
                Ok(())
            }),
        );

    for channel in [Channel::ButtonDown, Channel::ButtonUp, Channel::AxisChanged] {
        engine.bind(
            channel,
            handler(move |event| {
                if let Some(control) = event.control() {
                    info!(
                        "[{}] {} {} = {:.3}",
                        control.controller.slot(),
                        channel,
                        control.name(),
                        control.value
                    );
                }
                Ok(())
            }),
        );
    }

    engine.bind(
        Channel::Tick,
        handler(|event| {
            if let Event::Tick(controllers) = event {
                for controller in controllers.iter() {
                    debug!(
                        "[{}] held: {:?}",
                        controller.slot(),
                        controller.down_buttons()
                    );
                }
            }
            Ok(())
        }),
    );
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
