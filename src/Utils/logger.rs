//! Logger setup and CSV export of computed tables.
use std::fs::File;
use std::path::Path;

use chrono::Local;
use serde::Serialize;
use simplelog::{
    ColorChoice, CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

use crate::errors::{EngineError, EngineResult};

/// Map a loglevel string to a filter. `"off"` and `"none"` disable logging.
pub fn level_filter(loglevel: Option<&str>) -> EngineResult<LevelFilter> {
    let Some(level) = loglevel else {
        return Ok(LevelFilter::Info);
    };
    match level.trim().to_lowercase().as_str() {
        "off" | "none" => Ok(LevelFilter::Off),
        "trace" => Ok(LevelFilter::Trace),
        "debug" => Ok(LevelFilter::Debug),
        "info" => Ok(LevelFilter::Info),
        "warn" => Ok(LevelFilter::Warn),
        "error" => Ok(LevelFilter::Error),
        other => Err(EngineError::validation(format!(
            "loglevel must be off, debug, info, warn or error, got '{other}'"
        ))),
    }
}

/// Initialise terminal logging and, optionally, a timestamped log file.
/// Returns `false` when logging is off or a logger was already installed.
pub fn init_logger(loglevel: Option<&str>, log_to_file: bool) -> EngineResult<bool> {
    let level = level_filter(loglevel)?;
    if level == LevelFilter::Off {
        return Ok(false);
    }
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if log_to_file {
        let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let name = format!("log_{}.txt", date_and_time);
        let file = File::create(&name).map_err(|e| EngineError::Io(format!("{name}: {e}")))?;
        loggers.push(WriteLogger::new(level, Config::default(), file));
    }
    Ok(CombinedLogger::init(loggers).is_ok())
}

/// Write rows (iteration tables, accumulation rows) to a CSV file with a header line.
pub fn save_rows_to_csv<T: Serialize>(rows: &[T], path: impl AsRef<Path>) -> EngineResult<()> {
    let path = path.as_ref();
    let io_err = |e: csv::Error| EngineError::Io(format!("{}: {e}", path.display()));
    let mut writer = csv::Writer::from_path(path).map_err(io_err)?;
    for row in rows {
        writer.serialize(row).map_err(io_err)?;
    }
    writer
        .flush()
        .map_err(|e| EngineError::Io(format!("{}: {e}", path.display())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        iteration: usize,
        x: f64,
    }

    #[test]
    fn level_strings() {
        assert_eq!(level_filter(None).unwrap(), LevelFilter::Info);
        assert_eq!(level_filter(Some("none")).unwrap(), LevelFilter::Off);
        assert_eq!(level_filter(Some("DEBUG")).unwrap(), LevelFilter::Debug);
        assert!(level_filter(Some("loud")).is_err());
    }

    #[test]
    fn disabled_logger_is_not_installed() {
        assert!(!init_logger(Some("off"), false).unwrap());
    }

    #[test]
    fn rows_are_written_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.csv");
        let rows = vec![Row { iteration: 1, x: 1.5 }, Row { iteration: 2, x: 1.25 }];
        save_rows_to_csv(&rows, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["iteration,x", "1,1.5", "2,1.25"]);
    }
}
