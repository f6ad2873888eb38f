//! Protocole commande/réponse avec le robot.
//!
//! Sortant : `F`, `L`, `R` ou `B` suivi de `\n`.
//! Entrant : `S <front> <left> <right>` ; toute autre ligne est de la télémétrie.
//!
//! Un échange = une commande puis une seule attente bornée de la réponse.

use std::time::{Duration, Instant};

use crate::error::Result;
use crate::link::Link;
use crate::navigation::Command;
use crate::sensors::SensorReading;

pub const REPLY_MARKER: char = 'S';
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_millis(2000);

/// États d'un échange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    Idle,
    Sent,
    AwaitingReply,
    Parsed(SensorReading),
    TimedOut,
}

/// Classification d'une ligne entrante.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundLine {
    Reply(SensorReading),
    /// Commence par le marqueur mais ne se lit pas comme trois drapeaux 0/1.
    Malformed,
    Telemetry,
}

pub fn encode_command(command: Command) -> String {
    command.as_char().to_string()
}

pub fn classify_line(line: &str) -> InboundLine {
    let line = line.trim();
    if !line.starts_with(REPLY_MARKER) {
        return InboundLine::Telemetry;
    }
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 4 {
        return InboundLine::Malformed;
    }
    let parsed: std::result::Result<Vec<i64>, _> =
        parts[1..].iter().map(|p| p.parse::<i64>()).collect();
    match parsed.map(|v| SensorReading::from_flags(v[0], v[1], v[2])) {
        Ok(Some(reading)) => InboundLine::Reply(reading),
        _ => InboundLine::Malformed,
    }
}

/// Résultat d'un échange : la lecture (absente si timeout) et les lignes
/// reçues en chemin, pour le journal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExchangeReport {
    pub reading: Option<SensorReading>,
    pub received: Vec<String>,
}

/// Machine à états du protocole série. Bloquant et synchrone : une commande,
/// une réponse (ou un timeout), jamais de pipeline.
#[derive(Debug, Clone)]
pub struct CommandProtocol {
    reply_timeout: Duration,
    halt_marker: Option<char>,
    state: ExchangeState,
}

impl CommandProtocol {
    pub fn new(reply_timeout: Duration, halt_marker: Option<char>) -> Self {
        Self {
            reply_timeout,
            halt_marker,
            state: ExchangeState::Idle,
        }
    }

    pub fn state(&self) -> ExchangeState {
        self.state
    }

    /// Envoie `Halt` si un marqueur est configuré. Aucune réponse n'est attendue.
    pub fn send_halt<L: Link + ?Sized>(&mut self, link: &mut L) -> Result<()> {
        if let Some(marker) = self.halt_marker {
            link.send_line(&marker.to_string())?;
            log::debug!("→ {}", marker);
        }
        self.state = ExchangeState::Idle;
        Ok(())
    }

    /// Envoie une commande de mouvement et attend la réponse capteurs.
    ///
    /// `Ok(report)` avec `reading == None` = timeout ; `Err` = panne du lien.
    pub fn exchange<L: Link + ?Sized>(
        &mut self,
        link: &mut L,
        command: Command,
    ) -> Result<ExchangeReport> {
        if command == Command::Halt {
            self.send_halt(link)?;
            return Ok(ExchangeReport::default());
        }

        self.state = ExchangeState::Idle;
        let encoded = encode_command(command);
        link.send_line(&encoded)?;
        self.state = ExchangeState::Sent;
        log::debug!("→ {}", encoded);

        self.state = ExchangeState::AwaitingReply;
        let deadline = Instant::now() + self.reply_timeout;
        let mut report = ExchangeReport::default();

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            let Some(line) = link.recv_line(remaining)? else {
                break;
            };
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            log::debug!("← {}", line);
            report.received.push(line.clone());

            match classify_line(&line) {
                InboundLine::Reply(reading) => {
                    self.state = ExchangeState::Parsed(reading);
                    report.reading = Some(reading);
                    return Ok(report);
                }
                InboundLine::Malformed => log::debug!("malformed reply discarded: {:?}", line),
                InboundLine::Telemetry => {}
            }
        }

        self.state = ExchangeState::TimedOut;
        log::warn!(
            "no valid reply to {} within {} ms",
            encoded,
            self.reply_timeout.as_millis()
        );
        Ok(report)
    }
}

impl Default for CommandProtocol {
    fn default() -> Self {
        Self::new(DEFAULT_REPLY_TIMEOUT, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::{MockLink, MockReply};

    #[test]
    fn test_classify_line() {
        assert_eq!(
            classify_line("S 1 0 1"),
            InboundLine::Reply(SensorReading::new(true, false, true))
        );
        assert_eq!(classify_line("  S 0 0 0 "), InboundLine::Reply(SensorReading::default()));
        assert_eq!(classify_line("ESP32 MICROMOUSE READY"), InboundLine::Telemetry);
        assert_eq!(classify_line("S 1 0"), InboundLine::Malformed);
        assert_eq!(classify_line("S 1 x 0"), InboundLine::Malformed);
        assert_eq!(classify_line("S 1 0 0 0"), InboundLine::Malformed);
    }

    #[test]
    fn test_flags_other_than_zero_or_one_are_malformed() {
        assert_eq!(classify_line("S 2 -1 0"), InboundLine::Malformed);
        assert_eq!(classify_line("S 0 0 7"), InboundLine::Malformed);

        // la ligne est ignorée, l'attente continue jusqu'à la vraie réponse
        let mut link = MockLink::new();
        link.push_line("S 2 -1 0");
        link.push_line("S 0 0 1");
        let mut protocol = CommandProtocol::default();
        let report = protocol.exchange(&mut link, Command::Forward).unwrap();
        assert_eq!(report.reading, Some(SensorReading::new(false, false, true)));
        assert_eq!(report.received.len(), 2);
    }

    #[test]
    fn test_exchange_skips_noise_and_malformed() {
        let mut link = MockLink::new();
        link.push_line("ESP32 MICROMOUSE READY");
        link.push_line("S oops");
        link.push_line("S 0 1 0");
        let mut protocol = CommandProtocol::default();

        let report = protocol.exchange(&mut link, Command::TurnLeft).unwrap();
        assert_eq!(report.reading, Some(SensorReading::new(false, true, false)));
        assert_eq!(report.received.len(), 3);
        assert_eq!(link.written(), vec!["L".to_string()]);
        assert_eq!(
            protocol.state(),
            ExchangeState::Parsed(SensorReading::new(false, true, false))
        );
    }

    #[test]
    fn test_exchange_times_out() {
        let mut link = MockLink::new();
        link.push_line("telemetry only");
        link.push(MockReply::Silence);
        let mut protocol = CommandProtocol::new(Duration::from_millis(50), None);

        let report = protocol.exchange(&mut link, Command::Forward).unwrap();
        assert_eq!(report.reading, None);
        assert_eq!(protocol.state(), ExchangeState::TimedOut);
    }

    /// Lien qui n'envoie que de la télémétrie, une ligne toutes les 5 ms.
    struct ChattyLink {
        lines: usize,
    }

    impl Link for ChattyLink {
        fn send_line(&mut self, _line: &str) -> Result<()> {
            Ok(())
        }

        fn recv_line(&mut self, timeout: Duration) -> Result<Option<String>> {
            let pause = Duration::from_millis(5);
            if timeout < pause {
                std::thread::sleep(timeout);
                return Ok(None);
            }
            std::thread::sleep(pause);
            self.lines += 1;
            Ok(Some(format!("ENC {} {}", self.lines, self.lines)))
        }
    }

    #[test]
    fn test_noise_does_not_extend_the_deadline() {
        let mut link = ChattyLink { lines: 0 };
        let timeout = Duration::from_millis(100);
        let mut protocol = CommandProtocol::new(timeout, None);

        let start = Instant::now();
        let report = protocol.exchange(&mut link, Command::Forward).unwrap();
        let elapsed = start.elapsed();

        assert_eq!(report.reading, None);
        assert_eq!(protocol.state(), ExchangeState::TimedOut);
        assert!(elapsed >= timeout);
        assert!(elapsed < timeout + Duration::from_millis(50), "waited {:?}", elapsed);
        assert!(!report.received.is_empty());
        assert_eq!(report.received.len(), link.lines);
    }

    #[test]
    fn test_exchange_reports_transport_failure() {
        let mut link = MockLink::new();
        link.push(MockReply::Broken);
        let mut protocol = CommandProtocol::default();
        assert!(protocol.exchange(&mut link, Command::Forward).is_err());

        link.fail_sends(true);
        assert!(protocol.exchange(&mut link, Command::Forward).is_err());
    }

    #[test]
    fn test_halt_is_local_unless_marker_configured() {
        let mut link = MockLink::new();
        let mut protocol = CommandProtocol::default();
        protocol.exchange(&mut link, Command::Halt).unwrap();
        assert!(link.written().is_empty());

        let mut protocol = CommandProtocol::new(DEFAULT_REPLY_TIMEOUT, Some('X'));
        let report = protocol.exchange(&mut link, Command::Halt).unwrap();
        assert_eq!(report.reading, None);
        assert_eq!(link.written(), vec!["X".to_string()]);
    }
}
