//! Lien ligne par ligne avec le robot (port série, TCP vers le simulateur, mock).
//!
//! Contrat commun : `recv_line` attend au plus `timeout` et rend
//! `Ok(None)` si rien n'est arrivé. Une `Err` veut dire que le lien lui-même
//! est en panne.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

use crate::error::{MouseError, Result};

pub trait Link {
    /// Envoie une ligne (le `\n` est ajouté) puis vide le tampon de sortie.
    fn send_line(&mut self, line: &str) -> Result<()>;

    /// Attend une ligne complète, sans son terminateur.
    fn recv_line(&mut self, timeout: Duration) -> Result<Option<String>>;
}

impl<L: Link + ?Sized> Link for Box<L> {
    fn send_line(&mut self, line: &str) -> Result<()> {
        (**self).send_line(line)
    }

    fn recv_line(&mut self, timeout: Duration) -> Result<Option<String>> {
        (**self).recv_line(timeout)
    }
}

/// Accumule les octets reçus et découpe les lignes (`\n`, `\r` ignoré).
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn push(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    pub fn take_line(&mut self) -> Option<String> {
        let pos = self.pending.iter().position(|&b| b == b'\n')?;
        let raw: Vec<u8> = self.pending.drain(..=pos).collect();
        let line = String::from_utf8_lossy(&raw[..pos]);
        Some(line.trim_end_matches('\r').to_string())
    }
}

/// Boucle de lecture commune : `read` lit un morceau avec le délai restant.
fn read_line_until<F>(
    buffer: &mut LineBuffer,
    timeout: Duration,
    mut read: F,
) -> Result<Option<String>>
where
    F: FnMut(&mut [u8], Duration) -> io::Result<usize>,
{
    let deadline = Instant::now() + timeout;
    let mut chunk = [0u8; 256];
    loop {
        if let Some(line) = buffer.take_line() {
            return Ok(Some(line));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        let remaining = (deadline - now).max(Duration::from_millis(1));
        match read(&mut chunk, remaining) {
            Ok(0) => return Err(MouseError::LinkClosed),
            Ok(n) => buffer.push(&chunk[..n]),
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
                return Ok(None);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Lien UART vers l'ESP32 (8N1, sans contrôle de flux).
pub struct SerialLink {
    port: Box<dyn SerialPort>,
    buffer: LineBuffer,
}

impl SerialLink {
    /// Ouvre un port série
    ///
    /// # Arguments
    /// * `path` - chemin du port (ex. "/dev/ttyUSB0")
    /// * `baud_rate` - débit (115200 pour le firmware de référence)
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(path, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(Duration::from_millis(100))
            .open()?;

        log::info!("Opened serial port: {} at {} baud", path, baud_rate);

        Ok(SerialLink {
            port,
            buffer: LineBuffer::default(),
        })
    }

    /// Cherche un port qui ressemble à une carte USB-série (ttyUSB*, ttyACM*).
    pub fn discover() -> Option<String> {
        let ports = match serialport::available_ports() {
            Ok(ports) => ports,
            Err(e) => {
                log::warn!("Serial port discovery failed: {}", e);
                return None;
            }
        };
        let found = ports
            .into_iter()
            .map(|p| p.port_name)
            .find(|name| name.contains("ttyUSB") || name.contains("ttyACM"));
        match &found {
            Some(name) => log::info!("Serial port detected: {}", name),
            None => log::warn!("No USB serial port found"),
        }
        found
    }
}

impl Link for SerialLink {
    fn send_line(&mut self, line: &str) -> Result<()> {
        self.port.write_all(line.as_bytes())?;
        self.port.write_all(b"\n")?;
        self.port.flush()?;
        Ok(())
    }

    fn recv_line(&mut self, timeout: Duration) -> Result<Option<String>> {
        let port = &mut self.port;
        read_line_until(&mut self.buffer, timeout, |chunk, remaining| {
            port.set_timeout(remaining).map_err(io::Error::from)?;
            port.read(chunk)
        })
    }
}

/// Lien TCP, utilisé avec `mouse-sim`.
pub struct TcpLink {
    stream: TcpStream,
    buffer: LineBuffer,
}

impl TcpLink {
    pub fn connect<A: ToSocketAddrs>(address: A) -> Result<Self> {
        let stream = TcpStream::connect(address)?;
        stream.set_nodelay(true)?;
        log::info!("Connected to simulator at {}", stream.peer_addr()?);
        Ok(Self::from_stream(stream))
    }

    pub fn from_stream(stream: TcpStream) -> Self {
        Self {
            stream,
            buffer: LineBuffer::default(),
        }
    }
}

impl Link for TcpLink {
    fn send_line(&mut self, line: &str) -> Result<()> {
        self.stream.write_all(line.as_bytes())?;
        self.stream.write_all(b"\n")?;
        self.stream.flush()?;
        Ok(())
    }

    fn recv_line(&mut self, timeout: Duration) -> Result<Option<String>> {
        let stream = &mut self.stream;
        read_line_until(&mut self.buffer, timeout, |chunk, remaining| {
            stream.set_read_timeout(Some(remaining))?;
            stream.read(chunk)
        })
    }
}

/// Réponse programmée d'un `MockLink`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    Line(String),
    /// Rien n'arrive avant le timeout.
    Silence,
    /// Le lien tombe.
    Broken,
}

#[derive(Debug, Default)]
struct MockLinkInner {
    replies: VecDeque<MockReply>,
    written: Vec<String>,
    fail_send: bool,
}

/// Lien en mémoire pour les tests : les réponses sont programmées à l'avance,
/// les lignes envoyées sont enregistrées. Les clones partagent le même état.
#[derive(Debug, Clone, Default)]
pub struct MockLink {
    inner: Arc<Mutex<MockLinkInner>>,
}

impl MockLink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockLinkInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push_line(&self, line: &str) {
        self.lock().replies.push_back(MockReply::Line(line.to_string()));
    }

    pub fn push(&self, reply: MockReply) {
        self.lock().replies.push_back(reply);
    }

    pub fn fail_sends(&self, fail: bool) {
        self.lock().fail_send = fail;
    }

    /// Lignes envoyées jusqu'ici (sans `\n`).
    pub fn written(&self) -> Vec<String> {
        self.lock().written.clone()
    }
}

impl Link for MockLink {
    fn send_line(&mut self, line: &str) -> Result<()> {
        let mut inner = self.lock();
        if inner.fail_send {
            return Err(MouseError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "mock link write failure",
            )));
        }
        inner.written.push(line.to_string());
        Ok(())
    }

    fn recv_line(&mut self, _timeout: Duration) -> Result<Option<String>> {
        match self.lock().replies.pop_front() {
            Some(MockReply::Line(line)) => Ok(Some(line)),
            Some(MockReply::Silence) | None => Ok(None),
            Some(MockReply::Broken) => Err(MouseError::LinkClosed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_line_buffer_splits_and_strips_cr() {
        let mut buffer = LineBuffer::default();
        buffer.push(b"ESP32 READY\r\nS 1 0");
        assert_eq!(buffer.take_line().as_deref(), Some("ESP32 READY"));
        assert_eq!(buffer.take_line(), None);
        buffer.push(b" 1\n");
        assert_eq!(buffer.take_line().as_deref(), Some("S 1 0 1"));
    }

    #[test]
    fn test_mock_link_replays_script() {
        let mut link = MockLink::new();
        let observer = link.clone();
        link.push_line("S 0 0 0");
        link.push(MockReply::Broken);
        link.send_line("F").unwrap();
        assert_eq!(observer.written(), vec!["F".to_string()]);
        assert_eq!(
            link.recv_line(Duration::from_millis(1)).unwrap().as_deref(),
            Some("S 0 0 0")
        );
        assert!(link.recv_line(Duration::from_millis(1)).is_err());
        assert_eq!(link.recv_line(Duration::from_millis(1)).unwrap(), None);
    }

    #[test]
    fn test_tcp_link_times_out_then_reads() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = std::sync::mpsc::channel::<()>();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            rx.recv().unwrap();
            stream.write_all(b"S 1 1 0\n").unwrap();
            rx.recv().unwrap();
        });

        let mut link = TcpLink::connect(addr).unwrap();
        assert_eq!(link.recv_line(Duration::from_millis(20)).unwrap(), None);
        tx.send(()).unwrap();
        assert_eq!(
            link.recv_line(Duration::from_secs(2)).unwrap().as_deref(),
            Some("S 1 1 0")
        );
        tx.send(()).unwrap();
        handle.join().unwrap();
        assert!(matches!(
            link.recv_line(Duration::from_secs(2)),
            Err(MouseError::LinkClosed) | Err(MouseError::Io(_))
        ));
    }
}
