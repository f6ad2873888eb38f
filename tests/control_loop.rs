use std::net::TcpListener;
use std::thread;

use rusty_mouse::link::TcpLink;
use rusty_mouse::sim::{serve_connection, SimMaze, SimulatedRobot};
use rusty_mouse::{
    Command, CycleOutcome, Direction, HaltReason, MouseConfig, MouseController, Player,
};

fn reference_config() -> MouseConfig {
    let mut config = MouseConfig::default();
    config.reply_timeout_ms = 200;
    config
}

#[test]
fn test_open_maze_reaches_goal() {
    let maze = SimMaze::open(6, 12).unwrap();
    let robot = SimulatedRobot::new(maze, Player::new(5, 0, Direction::North));
    let mut controller = MouseController::new(&reference_config(), robot).unwrap();

    let summary = controller.run_until_halt(100).unwrap();
    // 5 F, 1 R en (0,0), 11 F, puis l'arrêt
    assert_eq!(summary.cycles, 18);
    assert_eq!(summary.halted, Some(HaltReason::GoalReached));
    assert_eq!(*controller.player(), Player::new(0, 11, Direction::East));
    assert_eq!(*controller.link().pose(), *controller.player());
    assert_eq!(controller.link().bumps(), 0);

    // Le bord ouest et le bord nord ont été vus en chemin.
    assert!(controller.map().has_wall((3, 0), Direction::West));
    assert!(controller.map().has_wall((0, 5), Direction::North));
    assert!(controller.map().walls_are_symmetric());
    assert!(controller.snapshot().at_goal);
}

#[test]
fn test_corridor_walls_are_discovered_without_collision() {
    // Une cloison à l'est de la colonne 0, lignes 1 à 5 : le robot longe le mur.
    let walls: Vec<_> = (1..6).map(|r| ((r, 0), Direction::East)).collect();
    let maze = SimMaze::with_walls(6, 12, &walls).unwrap();
    let robot = SimulatedRobot::new(maze, Player::new(5, 0, Direction::North)).with_noise(0.5, 3);
    let mut controller = MouseController::new(&reference_config(), robot).unwrap();

    let summary = controller.run_until_halt(100).unwrap();
    assert_eq!(summary.halted, Some(HaltReason::GoalReached));
    assert_eq!(controller.link().bumps(), 0);

    let truth = controller.link().maze().interior().clone();
    for ((r, c), cell) in controller.map().iter() {
        for d in Direction::ALL {
            if cell.walls.has(d) {
                assert!(
                    controller.link().maze().is_blocked((r, c), d),
                    "phantom wall at {:?} {:?}",
                    (r, c),
                    d
                );
            }
        }
    }
    for r in 1..5 {
        assert!(controller.map().has_wall((r, 0), Direction::East));
        assert!(controller.map().has_wall((r, 1), Direction::West));
        assert!(truth.has_wall((r, 1), Direction::West));
    }
}

#[test]
fn test_controller_over_tcp_simulator() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let maze = SimMaze::open(3, 3).unwrap();
        let mut robot = SimulatedRobot::new(maze, Player::new(2, 0, Direction::North));
        serve_connection(&mut robot, stream).unwrap();
        *robot.pose()
    });

    let link = TcpLink::connect(addr).unwrap();
    let mut config = MouseConfig::with_dimensions(3, 3, vec![(0, 2)]);
    config.reply_timeout_ms = 2000;
    let mut controller = MouseController::new(&config, link).unwrap();

    let first = controller.run_cycle().unwrap();
    assert_eq!(
        first,
        CycleOutcome::Moved {
            command: Command::Forward,
            sensors: Some(rusty_mouse::SensorReading::new(false, true, false)),
        }
    );
    let summary = controller.run_until_halt(20).unwrap();
    assert_eq!(summary.halted, Some(HaltReason::GoalReached));
    assert!(controller.logs().any(|line| line.contains("ESP32 MICROMOUSE READY")));

    let final_pose = *controller.player();
    drop(controller);
    assert_eq!(server.join().unwrap(), final_pose);
}
