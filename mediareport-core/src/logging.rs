//! File logging for export sessions.
//!
//! Console logging belongs to the binary; the library only offers a log4rs
//! file appender so a batch run can keep a trace next to its exports.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use log::LevelFilter;
use log4rs::{
    append::file::FileAppender,
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};

/// Pattern of every line written to the log file.
pub const FILE_LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} [{l}] {m}{n}";

/// `mediareport_<timestamp>.log` inside `log_dir`.
pub fn session_log_file(log_dir: &Path) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    log_dir.join(format!("mediareport_{timestamp}.log"))
}

/// Routes every log record at `log_level` or above to `log_file`. Fails if
/// a logger is already installed.
pub fn setup_file_logging(log_file: &Path, log_level: LevelFilter) -> Result<()> {
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(FILE_LOG_PATTERN)))
        .build(log_file)?;

    let config = Config::builder()
        .appender(Appender::builder().build("file", Box::new(file_appender)))
        .build(Root::builder().appender("file").build(log_level))?;

    log4rs::init_config(config)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_file_name() {
        let path = session_log_file(Path::new("/var/log/mr"));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("mediareport_"));
        assert!(name.ends_with(".log"));
        assert_eq!(path.parent(), Some(Path::new("/var/log/mr")));
    }
}
