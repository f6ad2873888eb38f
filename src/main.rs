use std::net::TcpStream;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::Parser;
use rusty_mouse::ascii_utils::visualize_maze_ascii;
use rusty_mouse::link::{Link, SerialLink, TcpLink};
use rusty_mouse::network;
use rusty_mouse::{CycleOutcome, MouseConfig, MouseController, MouseError, Result};

/// Contrôleur micromouse : flood fill sur PC, mouvements exécutés par l'ESP32.
#[derive(Parser, Debug)]
#[command(name = "rusty-mouse", version)]
struct Cli {
    /// Fichier de configuration TOML
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port série du robot (détection automatique sinon)
    #[arg(short, long, conflicts_with = "tcp")]
    port: Option<String>,

    /// Se connecter au simulateur `mouse-sim` au lieu du port série
    #[arg(long, num_args = 0..=1, default_missing_value = rusty_mouse::SIM_ADDRESS)]
    tcp: Option<String>,

    /// Nombre maximal de cycles
    #[arg(long, default_value_t = 500)]
    max_cycles: usize,

    /// Pause entre deux cycles, en millisecondes
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,

    /// Pousser un snapshot JSON vers ce visualiseur après chaque cycle
    #[arg(long)]
    viewer: Option<String>,

    /// Afficher la carte en ASCII après chaque cycle
    #[arg(long)]
    ascii: bool,
}

fn open_link(cli: &Cli, config: &MouseConfig) -> Result<Box<dyn Link>> {
    if let Some(address) = &cli.tcp {
        return Ok(Box::new(TcpLink::connect(address.as_str())?));
    }
    let port = cli
        .port
        .clone()
        .or_else(|| config.serial.port.clone())
        .or_else(SerialLink::discover)
        .ok_or_else(|| MouseError::Config("no serial port available".into()))?;
    let link = SerialLink::open(&port, config.serial.baud_rate)?;
    // L'ESP32 redémarre à l'ouverture du port.
    thread::sleep(Duration::from_secs(2));
    Ok(Box::new(link))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => {
            log::info!("Using config: {}", path.display());
            MouseConfig::from_file(path)?
        }
        None => MouseConfig::default(),
    };

    let link = open_link(&cli, &config)?;
    let mut controller = MouseController::new(&config, link)?;

    let mut viewer: Option<TcpStream> = match &cli.viewer {
        Some(address) => match network::connect_to_viewer(address) {
            Ok(stream) => Some(stream),
            Err(e) => {
                log::warn!("Viewer {} unreachable: {}", address, e);
                None
            }
        },
        None => None,
    };

    let mut failure = None;
    let mut cycles = 0;
    while cycles < cli.max_cycles {
        cycles += 1;
        let outcome = match controller.run_cycle() {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("Cycle {} aborted: {}", cycles, e);
                failure = Some(e);
                break;
            }
        };

        if cli.ascii {
            println!(
                "{}",
                visualize_maze_ascii(controller.map(), controller.player(), controller.goals())
            );
        }
        if let Some(stream) = viewer.as_mut() {
            if let Err(e) = network::publish_snapshot(stream, &controller.snapshot()) {
                log::warn!("Viewer disconnected: {}", e);
                viewer = None;
            }
        }

        if let CycleOutcome::Halted(reason) = outcome {
            log::info!("Stopped after {} cycle(s): {:?}", cycles, reason);
            break;
        }
        if cli.delay_ms > 0 {
            thread::sleep(Duration::from_millis(cli.delay_ms));
        }
    }

    println!("{}", controller.snapshot().to_json()?);

    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
