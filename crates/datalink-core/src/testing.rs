//! Fake backend shared by the unit tests

use std::io;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

use crate::ConnectionManager;

#[derive(Debug)]
pub struct FakeConnection {
    pub id: u32,
    pub broken: bool,
}

#[derive(Debug, thiserror::Error)]
#[error("backend unreachable")]
pub struct FakeError;

/// Manager whose next `failures` connects fail
#[derive(Debug, Default)]
pub struct FakeManager {
    failures_left: AtomicU32,
    opened: AtomicU32,
    connect_attempts: AtomicU32,
    reject_idle: AtomicBool,
}

impl FakeManager {
    pub fn failing(failures: u32) -> Self {
        let manager = Self::default();
        manager.fail_next(failures);
        manager
    }

    pub fn fail_next(&self, failures: u32) {
        self.failures_left.store(failures, Ordering::SeqCst);
    }

    pub fn reject_idle(&self, reject: bool) {
        self.reject_idle.store(reject, Ordering::SeqCst);
    }

    /// Connections successfully opened so far
    pub fn opened(&self) -> u32 {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn connect_attempts(&self) -> u32 {
        self.connect_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectionManager for FakeManager {
    type Connection = FakeConnection;
    type Error = FakeError;

    async fn connect(&self) -> Result<FakeConnection, FakeError> {
        self.connect_attempts.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(FakeError);
        }
        let id = self.opened.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(FakeConnection { id, broken: false })
    }

    async fn is_valid(&self, _conn: &mut FakeConnection) -> bool {
        !self.reject_idle.load(Ordering::SeqCst)
    }

    fn has_broken(&self, conn: &FakeConnection) -> bool {
        conn.broken
    }
}

/// Collects formatted log lines emitted on the current thread
///
/// Events are rendered by the plain fmt layer without timestamps, so a line
/// reads like `ERROR target: message field="value"`.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// Start capturing; capture stops when the guard drops
    pub fn start() -> (Self, DefaultGuard) {
        let capture = Self::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(capture.clone())
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::TRACE)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    pub fn lines(&self) -> Vec<String> {
        let buffer = self.buffer.lock().unwrap();
        String::from_utf8_lossy(&buffer).lines().map(str::to_string).collect()
    }

    /// Lines at `level` (e.g. `"ERROR"`) that contain every one of `needles`
    pub fn matching(&self, level: &str, needles: &[&str]) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| line.trim_start().starts_with(level))
            .filter(|line| needles.iter().all(|needle| line.contains(needle)))
            .collect()
    }
}

pub struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CaptureWriter(Arc::clone(&self.buffer))
    }
}
