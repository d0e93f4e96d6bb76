//! Leveled console logger behind the `log` facade.
//!
//! Which levels are printed is controlled by a [`LevelMask`], and output can be
//! restricted to a single source file with a [`FileFilter`]. Both live in a
//! [`LogConfig`] that is built (or loaded) once and handed to [`init`] before
//! any widget is created.

use chrono::Local;
use console::Style;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use serde::{Deserialize, Serialize};
use std::{
    io::Write,
    ops::{BitOr, BitOrAssign},
};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct LevelMask(u32);

impl LevelMask {
    pub const NONE: LevelMask = LevelMask(0);
    pub const TRACE: LevelMask = LevelMask(1 << 0);
    pub const DEBUG: LevelMask = LevelMask(1 << 1);
    pub const INFO: LevelMask = LevelMask(1 << 2);
    pub const WARNING: LevelMask = LevelMask(1 << 3);
    pub const ERROR: LevelMask = LevelMask(1 << 4);
    pub const ALL: LevelMask = LevelMask(
        Self::TRACE.0 | Self::DEBUG.0 | Self::INFO.0 | Self::WARNING.0 | Self::ERROR.0,
    );

    /// Unknown bits are dropped.
    pub const fn from_bits(bits: u32) -> Self {
        LevelMask(bits & Self::ALL.0)
    }
    pub const fn bits(self) -> u32 {
        self.0
    }

    pub fn of(level: Level) -> Self {
        match level {
            Level::Trace => Self::TRACE,
            Level::Debug => Self::DEBUG,
            Level::Info => Self::INFO,
            Level::Warn => Self::WARNING,
            Level::Error => Self::ERROR,
        }
    }
    pub fn contains(self, other: LevelMask) -> bool {
        self.0 & other.0 == other.0
    }
    pub fn allows(self, level: Level) -> bool {
        self.contains(Self::of(level))
    }

    /// The most verbose level enabled by this mask.
    pub fn max_level_filter(self) -> LevelFilter {
        if self.contains(Self::TRACE) {
            LevelFilter::Trace
        } else if self.contains(Self::DEBUG) {
            LevelFilter::Debug
        } else if self.contains(Self::INFO) {
            LevelFilter::Info
        } else if self.contains(Self::WARNING) {
            LevelFilter::Warn
        } else if self.contains(Self::ERROR) {
            LevelFilter::Error
        } else {
            LevelFilter::Off
        }
    }
}

impl Default for LevelMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl BitOr for LevelMask {
    type Output = LevelMask;
    fn bitor(self, rhs: LevelMask) -> LevelMask {
        LevelMask(self.0 | rhs.0)
    }
}
impl BitOrAssign for LevelMask {
    fn bitor_assign(&mut self, rhs: LevelMask) {
        self.0 |= rhs.0;
    }
}

impl From<u32> for LevelMask {
    fn from(bits: u32) -> Self {
        LevelMask::from_bits(bits)
    }
}
impl From<LevelMask> for u32 {
    fn from(mask: LevelMask) -> Self {
        mask.0
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FileFilter {
    #[default]
    All,
    /// Only records from the source file with this name (no directories) are printed.
    Only(String),
}

impl FileFilter {
    pub const ALL_KEYWORD: &'static str = "ALL";

    pub fn allows(&self, path: Option<&str>) -> bool {
        match self {
            FileFilter::All => true,
            FileFilter::Only(name) => path.map(file_name) == Some(name.as_str()),
        }
    }
}

impl From<String> for FileFilter {
    fn from(value: String) -> Self {
        if value == Self::ALL_KEYWORD {
            FileFilter::All
        } else {
            FileFilter::Only(value)
        }
    }
}
impl From<FileFilter> for String {
    fn from(filter: FileFilter) -> Self {
        match filter {
            FileFilter::All => FileFilter::ALL_KEYWORD.to_owned(),
            FileFilter::Only(name) => name,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub levels: LevelMask,
    #[serde(default)]
    pub file: FileFilter,
}

impl LogConfig {
    pub fn allows(&self, level: Level, file: Option<&str>) -> bool {
        self.levels.allows(level) && self.file.allows(file)
    }
}

/// Strips everything up to the last `/` or `\`.
pub fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

pub fn level_name(level: Level) -> &'static str {
    match level {
        Level::Trace => "TRACE",
        Level::Debug => "DEBUG",
        Level::Info => "INFO",
        Level::Warn => "WARNING",
        Level::Error => "ERROR",
    }
}

fn level_style(level: Level) -> Style {
    match level {
        Level::Trace => Style::new().black().bright(),
        Level::Debug => Style::new().cyan(),
        Level::Info => Style::new().green(),
        Level::Warn => Style::new().yellow(),
        Level::Error => Style::new().red(),
    }
}

pub fn format_record(record: &Record, time: &str) -> String {
    format!(
        "[{}]\n[Time: {}]\n[File: {}]\n[Line: {}]\n[Function: {}]\n[Message: {}]",
        level_name(record.level()),
        time,
        record.file().map(file_name).unwrap_or("unknown"),
        record
            .line()
            .map(|line| line.to_string())
            .unwrap_or_else(|| "?".to_owned()),
        record.module_path().unwrap_or("unknown"),
        record.args(),
    )
}

pub struct ConsoleLogger {
    config: LogConfig,
}

impl ConsoleLogger {
    pub fn new(config: LogConfig) -> Self {
        ConsoleLogger { config }
    }
    pub fn config(&self) -> &LogConfig {
        &self.config
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.config.levels.allows(metadata.level())
    }

    fn log(&self, record: &Record) {
        if !self.config.allows(record.level(), record.file()) {
            return;
        }
        let time = Local::now().format("%H:%M:%S").to_string();
        let block = format_record(record, &time);
        // One record at a time; the lock is held for the whole block.
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "\n{}\n", level_style(record.level()).apply_to(block));
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
    }
}

/// Installs a [`ConsoleLogger`] as the global logger. Fails if a logger was already set.
pub fn init(config: LogConfig) -> Result<(), SetLoggerError> {
    let max_level = config.levels.max_level_filter();
    log::set_boxed_logger(Box::new(ConsoleLogger::new(config)))?;
    log::set_max_level(max_level);
    Ok(())
}
