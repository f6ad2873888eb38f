use std::collections::VecDeque;

use crate::config::MouseConfig;
use crate::error::Result;
use crate::flood_fill::recompute_distances;
use crate::link::Link;
use crate::map::{Coord, MazeMap};
use crate::navigation::{choose_next_move, halt_reason, Command, HaltReason};
use crate::player::Player;
use crate::protocol::CommandProtocol;
use crate::sensors::{fuse_walls, SensorReading};
use crate::snapshot::MazeSnapshot;

/// Résultat d'un cycle de contrôle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Une commande a été envoyée. `sensors` est `None` si la réponse n'est pas
    /// arrivée à temps (murs inchangés, pose tout de même mise à jour).
    Moved {
        command: Command,
        sensors: Option<SensorReading>,
    },
    /// Plus de mouvement possible : but atteint ou bloqué.
    Halted(HaltReason),
}

impl CycleOutcome {
    pub fn is_halted(&self) -> bool {
        matches!(self, CycleOutcome::Halted(_))
    }
}

/// Bilan de `run_until_halt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: usize,
    pub halted: Option<HaltReason>,
}

// -----------------------------------------------------------------------------
// MouseController
// -----------------------------------------------------------------------------

/// Contrôleur du robot : possède la carte, la pose, le lien et le journal.
///
/// Toutes les opérations qui modifient l'état prennent `&mut self`, un cycle et
/// un reset ne peuvent donc jamais se chevaucher. Pour partager le contrôleur
/// avec un affichage, l'envelopper dans un `Mutex`.
pub struct MouseController<L: Link> {
    link: L,
    pub(crate) map: MazeMap,
    goals: Vec<Coord>,
    player: Player,
    start: Player,
    protocol: CommandProtocol,
    last_command: Option<Command>,
    last_sensors: Option<SensorReading>,
    logs: VecDeque<String>,
    log_capacity: usize,
}

impl<L: Link> MouseController<L> {
    pub fn new(config: &MouseConfig, link: L) -> Result<Self> {
        config.validate()?;
        let mut controller = Self {
            link,
            map: MazeMap::new(config.rows, config.cols)?,
            goals: config.goals.clone(),
            player: config.start_pose(),
            start: config.start_pose(),
            protocol: CommandProtocol::new(config.reply_timeout(), config.halt_marker),
            last_command: None,
            last_sensors: None,
            logs: VecDeque::with_capacity(config.log_capacity),
            log_capacity: config.log_capacity,
        };
        controller.log(format!(
            "Maze {}x{} ready, goals {:?}",
            config.rows, config.cols, controller.goals
        ));
        Ok(controller)
    }

    fn log(&mut self, msg: String) {
        log::info!("{}", msg);
        self.push_log(msg);
    }

    fn push_log(&mut self, msg: String) {
        if self.logs.len() == self.log_capacity {
            self.logs.pop_front();
        }
        self.logs.push_back(msg);
    }

    /// Un cycle complet : flood fill, décision, échange, fusion des murs, pose.
    ///
    /// En cas de panne du lien, l'erreur est rendue et ni les murs ni la pose
    /// n'ont été modifiés.
    pub fn run_cycle(&mut self) -> Result<CycleOutcome> {
        // 1) Flood fill
        recompute_distances(&mut self.map, &self.goals);

        // 2) Décider du mouvement
        let command = choose_next_move(&self.map, &self.player);
        self.last_command = Some(command);
        self.log(format!("CMD: {}", command.as_char()));

        if command == Command::Halt {
            let reason = halt_reason(&self.map, &self.player);
            match reason {
                HaltReason::GoalReached => self.log("Goal reached".to_string()),
                HaltReason::NoViableMove => self.log("No viable move".to_string()),
            }
            self.protocol.send_halt(&mut self.link)?;
            return Ok(CycleOutcome::Halted(reason));
        }

        // 3) Envoyer la commande et lire les capteurs
        let report = match self.protocol.exchange(&mut self.link, command) {
            Ok(report) => report,
            Err(e) => {
                self.log(format!("Link failure: {}", e));
                return Err(e);
            }
        };
        for line in report.received {
            self.push_log(format!("← {}", line));
        }

        // 4) Fusion des murs à la pose où la commande a été donnée
        match report.reading {
            Some(reading) => {
                fuse_walls(&mut self.map, &self.player, reading);
            }
            None => self.log("No valid reply from robot, walls unchanged".to_string()),
        }
        self.last_sensors = report.reading;

        // 5) Mettre à jour la pose
        self.player.apply(command);

        Ok(CycleOutcome::Moved {
            command,
            sensors: report.reading,
        })
    }

    /// Enchaîne les cycles jusqu'à l'arrêt ou `max_cycles`.
    pub fn run_until_halt(&mut self, max_cycles: usize) -> Result<RunSummary> {
        for cycle in 0..max_cycles {
            if let CycleOutcome::Halted(reason) = self.run_cycle()? {
                return Ok(RunSummary {
                    cycles: cycle + 1,
                    halted: Some(reason),
                });
            }
        }
        Ok(RunSummary {
            cycles: max_cycles,
            halted: None,
        })
    }

    /// Nouvelle époque : carte vide, pose de départ, journal effacé.
    pub fn reset(&mut self) {
        self.map.reset();
        self.player = self.start;
        self.last_command = None;
        self.last_sensors = None;
        self.logs.clear();
        self.log("Maze reset".to_string());
    }

    /// Vue de l'état courant, sans effet de bord.
    pub fn snapshot(&self) -> MazeSnapshot {
        let logs: Vec<String> = self.logs.iter().cloned().collect();
        MazeSnapshot::capture(
            &self.map,
            &self.goals,
            &self.player,
            self.last_command,
            self.last_sensors,
            &logs,
        )
    }

    pub fn map(&self) -> &MazeMap {
        &self.map
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn goals(&self) -> &[Coord] {
        &self.goals
    }

    pub fn last_command(&self) -> Option<Command> {
        self.last_command
    }

    pub fn last_sensors(&self) -> Option<SensorReading> {
        self.last_sensors
    }

    pub fn logs(&self) -> impl Iterator<Item = &String> + '_ {
        self.logs.iter()
    }

    pub fn link(&self) -> &L {
        &self.link
    }
}
