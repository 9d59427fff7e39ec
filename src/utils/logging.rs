use crate::core::version::VersionToken;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Installs the stderr `tracing` subscriber. `RUST_LOG` wins over `-v`.
pub fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("local_reason={level}")));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Plain-text transcript of prompts and answers, appended as they happen.
pub struct TranscriptLog {
    file_path: Option<String>,
    is_active: bool,
}

impl TranscriptLog {
    /// A file given on the command line starts logging right away.
    pub fn new(log_file: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut logging = TranscriptLog {
            file_path: None,
            is_active: false,
        };
        if let Some(path) = log_file {
            logging.set_log_file(path)?;
        }
        Ok(logging)
    }

    pub fn set_log_file(&mut self, path: String) -> Result<String, Box<dyn std::error::Error>> {
        test_file_access(&path)?;

        self.file_path = Some(path.clone());
        self.is_active = true;

        Ok(format!("Logging enabled to: {path}"))
    }

    pub fn toggle_logging(
        &mut self,
        pause_message: &str,
    ) -> Result<String, Box<dyn std::error::Error>> {
        let Some(path) = self.file_path.clone() else {
            return Err(
                "No log file specified. Use /log <filename> to enable logging first.".into(),
            );
        };
        if self.is_active {
            self.write_lines(&format!("## {pause_message}"))?;
            self.is_active = false;
            Ok(format!("Logging paused (file: {path})"))
        } else {
            self.is_active = true;
            Ok(format!("Logging resumed to: {path}"))
        }
    }

    pub fn log_exchange(
        &self,
        version: VersionToken,
        prompt: &str,
        answer: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if !self.is_active {
            return Ok(());
        }
        self.write_lines(&format!("You [{}]: {prompt}", version.label()))?;
        self.write_lines(answer)
    }

    fn write_lines(&self, content: &str) -> Result<(), Box<dyn std::error::Error>> {
        let Some(file_path) = self.file_path.as_deref() else {
            return Ok(());
        };
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        let mut writer = BufWriter::new(file);

        for line in content.lines() {
            writeln!(writer, "{line}")?;
        }
        writeln!(writer)?;

        writer.flush()?;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn get_status_string(&self) -> String {
        let name = |path: &str| {
            Path::new(path)
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string()
        };
        match (&self.file_path, self.is_active) {
            (None, _) => "disabled".to_string(),
            (Some(path), true) => format!("active ({})", name(path)),
            (Some(path), false) => format!("paused ({})", name(path)),
        }
    }
}

fn test_file_access(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn disabled_log_writes_nothing() {
        let log = TranscriptLog::new(None).expect("no file is fine");
        assert!(!log.is_active());
        assert_eq!(log.get_status_string(), "disabled");
        log.log_exchange(VersionToken::Rag, "hi", "hello")
            .expect("noop");
    }

    #[test]
    fn exchanges_are_appended_and_pause_is_marked() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("transcript.txt");
        let path_str = path.to_string_lossy().to_string();

        let mut log = TranscriptLog::new(Some(path_str)).expect("log file");
        assert_eq!(log.get_status_string(), "active (transcript.txt)");

        log.log_exchange(VersionToken::Rag2, "What is serde?", "A serialization framework.\nFor Rust.")
            .expect("write");
        log.toggle_logging("Logging paused").expect("pause");
        log.log_exchange(VersionToken::Plain, "skipped", "skipped")
            .expect("noop while paused");
        assert_eq!(log.get_status_string(), "paused (transcript.txt)");

        let contents = fs::read_to_string(&path).expect("read transcript");
        assert_eq!(
            contents,
            "You [RAG-2]: What is serde?\n\nA serialization framework.\nFor Rust.\n\n## Logging paused\n\n"
        );
    }

    #[test]
    fn toggle_without_file_is_an_error() {
        let mut log = TranscriptLog::new(None).expect("no file");
        assert!(log.toggle_logging("paused").is_err());
    }
}
