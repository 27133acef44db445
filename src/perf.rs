//! Timing scopes and the edit journal.
//!
//! The journal is an optional file that receives one line per edit applied by
//! the script driver: elapsed time, step number, command and resulting state.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tracing::warn;

static ENABLED: AtomicBool = AtomicBool::new(false);
static JOURNAL: LazyLock<Mutex<Journal>> = LazyLock::new(|| Mutex::new(Journal::closed()));

/// Reports its lifetime on drop when timing is enabled.
#[derive(Debug)]
pub struct Scope {
    name: &'static str,
    start: Instant,
}

impl Drop for Scope {
    fn drop(&mut self) {
        if !is_enabled() {
            return;
        }
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        eprintln!("[perf] {}: {elapsed_ms:.3} ms", self.name);
    }
}

struct Journal {
    start: Instant,
    writer: Option<Box<dyn Write + Send>>,
}

impl Journal {
    fn closed() -> Self {
        Self {
            start: Instant::now(),
            writer: None,
        }
    }

    /// Write one line; a failed write closes the journal so the failure is
    /// reported only once.
    fn record(&mut self, step: usize, command: &str, state: &str) {
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        let written = writeln!(writer, "[{elapsed_ms:>10.3} ms] #{step} {command} => {state}")
            .and_then(|()| writer.flush());
        if let Err(err) = written {
            warn!(error = %err, "edit journal write failed; journal closed");
            self.writer = None;
        }
    }
}

fn journal() -> MutexGuard<'static, Journal> {
    JOURNAL.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

pub fn scope(name: &'static str) -> Scope {
    Scope {
        name,
        start: Instant::now(),
    }
}

/// Start writing the journal to `path`, or stop with `None`.
pub fn set_journal_path(path: Option<&Path>) -> std::io::Result<()> {
    let mut journal = journal();
    match path {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            writeln!(writer, "slotedit edit journal start")?;
            writer.flush()?;
            journal.start = Instant::now();
            journal.writer = Some(Box::new(writer));
        }
        None => journal.writer = None,
    }
    Ok(())
}

pub fn is_journal_enabled() -> bool {
    journal().writer.is_some()
}

/// Append one edit to the journal, if one is open.
pub fn record_edit(step: usize, command: &str, state: &str) {
    journal().record(step, command, state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_set_enabled_toggles_runtime_flag() {
        set_enabled(true);
        assert!(is_enabled());

        set_enabled(false);
        assert!(!is_enabled());
    }

    #[test]
    fn test_journal_records_edits_until_closed() {
        let temp_file = NamedTempFile::new().unwrap();
        set_journal_path(Some(temp_file.path())).unwrap();
        assert!(is_journal_enabled());
        record_edit(1, "insert a+b", "{a}+{b$}");
        set_journal_path(None).unwrap();
        assert!(!is_journal_enabled());
        record_edit(2, "backspace", "{a}+{$}");

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.starts_with("slotedit edit journal start"));
        assert!(content.contains("#1 insert a+b => {a}+{b$}"));
        assert!(!content.contains("#2"));
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_journal_write_closes_journal() {
        let mut journal = Journal {
            start: Instant::now(),
            writer: Some(Box::new(BrokenPipe)),
        };
        journal.record(1, "insert a", "{a$}");
        assert!(journal.writer.is_none());
        journal.record(2, "insert b", "{ab$}");
        assert!(journal.writer.is_none());
    }
}
