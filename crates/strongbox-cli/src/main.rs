//! `strongbox` runs the vault controller on a simulated board.
//!
//! Console commands (`opn`, `cfg`, `mov`, `door open`, `door close`, `shake`,
//! `tag <hex>`) are read from stdin, or from a serial port with the
//! `hardware-serial` feature. Any other line is typed on the keypad, one key
//! per `0-9`, `*` or `#`. The front panel is mirrored to stdout whenever it
//! changes and logs go to stderr.
//!
//! The vault keeps running when the console input ends; stop it with Ctrl-C.
//!
//! ```text
//! strongbox --config strongbox.toml --eeprom vault.img -v
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use strongbox_controller::{AccessController, ControllerConfig, Supervisor, watchdog};
use strongbox_core::constants::{DEFAULT_EEPROM_SIZE, DISPLAY_LINES};
use strongbox_hardware::Led;
use strongbox_hardware::board::{BoardHandles, Peripherals};
use strongbox_storage::{AnyEeprom, CredentialStore};

const PANEL_REFRESH: Duration = Duration::from_millis(100);

/// Vault access controller on a simulated board.
#[derive(Parser, Debug)]
#[command(name = "strongbox", version, about)]
struct Cli {
    /// Controller configuration file (TOML). Defaults apply when omitted.
    #[arg(short, long, env = "STRONGBOX_CONFIG")]
    config: Option<PathBuf>,

    /// EEPROM image file. An erased in-memory image is used when omitted.
    #[arg(short, long, env = "STRONGBOX_EEPROM")]
    eeprom: Option<PathBuf>,

    /// Capacity in bytes of a newly created EEPROM image
    #[arg(long, default_value_t = DEFAULT_EEPROM_SIZE)]
    eeprom_size: usize,

    /// Read console commands from this serial port instead of stdin
    #[cfg(feature = "hardware-serial")]
    #[arg(long)]
    serial: Option<String>,

    /// Serial port baud rate
    #[cfg(feature = "hardware-serial")]
    #[arg(long, default_value_t = 9600)]
    baud: u32,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn setup_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "strongbox={level},strongbox_controller={level},strongbox_hardware={level},strongbox_storage={level}"
        ))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .init();
}

async fn load_config(path: Option<&Path>) -> Result<ControllerConfig> {
    let Some(path) = path else {
        return Ok(ControllerConfig::default());
    };

    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: ControllerConfig = toml::from_str(&text)
        .with_context(|| format!("failed to parse config {}", path.display()))?;

    info!(path = %path.display(), "Loaded configuration");
    Ok(config)
}

#[cfg_attr(not(feature = "hardware-serial"), allow(unused_variables))]
async fn run_console(cli: &Cli, board: &BoardHandles) -> Result<()> {
    let console = board.console();

    #[cfg(feature = "hardware-serial")]
    if let Some(port) = &cli.serial {
        info!(port = %port, baud = cli.baud, "Reading console from serial port");
        let stream = strongbox_hardware::console::open_serial(port, cli.baud)?;
        console.run(stream).await?;
        return Ok(());
    }

    console.run(tokio::io::stdin()).await?;
    Ok(())
}

/// Await the console, then stay pending so the vault outlives its input.
async fn keep_after(console: impl Future<Output = Result<()>>) {
    match console.await {
        Ok(()) => info!("Console closed, vault keeps running"),
        Err(e) => error!(error = %e, "Console failed, vault keeps running"),
    }
    std::future::pending::<()>().await;
}

/// Print the display and indicators every time they change.
async fn mirror_panel(board: &BoardHandles) {
    let mut shown: Option<(Vec<String>, bool, bool, String)> = None;
    let mut ticker = tokio::time::interval(PANEL_REFRESH);

    loop {
        ticker.tick().await;

        let lines: Vec<String> = (0..DISPLAY_LINES).map(|l| board.display.line(l)).collect();
        let current = (
            lines,
            board.indicator.led(Led::Red),
            board.indicator.led(Led::Green),
            board.lock.position().to_string(),
        );
        if shown.as_ref() == Some(&current) {
            continue;
        }

        let (lines, red, green, lock) = &current;
        let on_off = |lit: bool| if lit { "on" } else { "off" };
        println!("+----------------+");
        for line in lines {
            println!("|{line:<16}|");
        }
        println!("+----------------+  red {}  green {}  lock {lock}", on_off(*red), on_off(*green));
        shown = Some(current);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    info!("Starting strongbox v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(cli.config.as_deref()).await?;

    let (eeprom, _) = AnyEeprom::open(cli.eeprom.as_deref(), cli.eeprom_size)
        .await
        .context("failed to open EEPROM image")?;
    if cli.eeprom.is_none() {
        warn!("No EEPROM image given, credential changes are lost on exit");
    }
    let store = CredentialStore::new(eeprom).context("EEPROM too small for a credential")?;

    let (peripherals, board) = Peripherals::simulated();
    let (heartbeat, monitor) = watchdog(config.timing.watchdog_timeout());
    let controller = AccessController::new(config, peripherals, store, heartbeat)
        .context("invalid configuration")?;

    let mut supervisor = Supervisor::new(controller, monitor);
    supervisor.boot().await;

    tokio::select! {
        _ = supervisor.run() => {}
        _ = keep_after(run_console(&cli, &board)) => {}
        _ = mirror_panel(&board) => {}
        result = tokio::signal::ctrl_c() => {
            result.context("failed to listen for shutdown signal")?;
            info!("Received shutdown signal");
        }
    }

    info!(restarts = supervisor.restarts(), "Strongbox shutting down");
    Ok(())
}
