use std::net::TcpListener;

use clap::Parser;
use rusty_mouse::sim::{serve_connection, SimMaze, SimulatedRobot};
use rusty_mouse::{Direction, Player, Result, SIM_ADDRESS};

/// Robot simulé : parle le protocole série de l'ESP32 sur TCP.
#[derive(Parser, Debug)]
#[command(name = "mouse-sim", version)]
struct Cli {
    #[arg(long, default_value = SIM_ADDRESS)]
    bind: String,

    #[arg(long, default_value_t = 6)]
    rows: usize,

    #[arg(long, default_value_t = 12)]
    cols: usize,

    /// Graine du générateur de labyrinthe
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Labyrinthe sans murs intérieurs
    #[arg(long)]
    open: bool,

    /// Probabilité d'une ligne de télémétrie avant chaque réponse
    #[arg(long, default_value_t = 0.0)]
    noise: f64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let listener = TcpListener::bind(&cli.bind)?;
    log::info!("Simulator listening on {}", cli.bind);

    // accept connections and process them serially
    for (session, stream) in listener.incoming().enumerate() {
        let stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                log::warn!("Connection failed: {}", e);
                continue;
            }
        };
        log::info!("New connection: {:?}", stream.peer_addr().ok());

        let maze = if cli.open {
            SimMaze::open(cli.rows, cli.cols)?
        } else {
            SimMaze::generate(cli.rows, cli.cols, cli.seed.wrapping_add(session as u64))?
        };
        let start = Player::new(cli.rows as i32 - 1, 0, Direction::North);
        let mut robot = SimulatedRobot::new(maze, start).with_noise(cli.noise, cli.seed);

        match serve_connection(&mut robot, stream) {
            Ok(()) => log::info!(
                "Session closed, robot at {:?}, {} bump(s)",
                robot.pose(),
                robot.bumps()
            ),
            Err(e) => log::warn!("Session error: {}", e),
        }
    }
    Ok(())
}
