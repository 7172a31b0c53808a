use crate::error::Result;
use chrono::Local;
use log::{LevelFilter, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Appends log records to a file, one line per record.
pub struct FileLogger {
    file: Mutex<File>,
    level: LevelFilter,
}

impl FileLogger {
    pub fn new(path: &Path, level: LevelFilter) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
            level,
        })
    }

    fn format(record: &Record) -> String {
        format!(
            "{} [{}] {}: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.target(),
            record.args()
        )
    }
}

impl log::Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        let _ = writeln!(file, "{}", Self::format(record));
    }

    fn flush(&self) {
        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        let _ = file.flush();
    }
}

/// Installs the process logger: stderr through env_logger by default, or
/// the given file. `RUST_LOG` still overrides the level on stderr.
pub fn init(debug: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if debug { LevelFilter::Debug } else { LevelFilter::Info };

    match log_file {
        Some(path) => {
            let logger = FileLogger::new(path, level)?;
            log::set_boxed_logger(Box::new(logger))
                .map_err(|e| crate::error::Error::ConfigError(e.to_string()))?;
            log::set_max_level(level);
        }
        None => {
            env_logger::Builder::new()
                .filter_level(level)
                .parse_default_env()
                .try_init()
                .map_err(|e| crate::error::Error::ConfigError(e.to_string()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{Level, Log};

    #[test]
    fn test_file_logger_respects_level() {
        let path = std::env::temp_dir().join(format!("token-scout-log-{}.log", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let logger = FileLogger::new(&path, LevelFilter::Info).unwrap();

        logger.log(
            &Record::builder()
                .level(Level::Info)
                .target("test")
                .args(format_args!("kept"))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(Level::Debug)
                .target("test")
                .args(format_args!("dropped"))
                .build(),
        );
        logger.flush();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[INFO] test: kept"));
        assert!(!contents.contains("dropped"));
        let _ = std::fs::remove_file(&path);
    }
}
