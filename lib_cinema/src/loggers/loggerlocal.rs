use super::logrecord::{LogLevel, Logrecord};
use chrono::Local;
use colored::*;
use glob::glob;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
/// # Logger Local Options
///
/// Configuration options for the `LoggerLocal` instance, controlling where and how
/// log messages are output.
pub struct LoggerLocalOptions {
    /// A list of log levels that should be printed to the TTY (console).
    pub use_tty: Option<Vec<i64>>,
    /// A list of log levels that should be written to a log file.
    pub use_file: Option<Vec<i64>>,
    /// A list of log levels that should be kept in memory, retrievable via `LoggerLocal::records`.
    pub use_memory: Option<Vec<i64>>,
    /// The directory where log files should be stored. If `None`, defaults to `./logs`.
    pub log_dir: Option<PathBuf>,
}

impl LoggerLocalOptions {
    /// TTY and file output for every level at or above `min_level`.
    pub fn with_min_level(min_level: LogLevel, log_dir: Option<PathBuf>) -> Self {
        Self {
            use_tty: Some(min_level.and_above()),
            use_file: Some(min_level.and_above()),
            use_memory: None,
            log_dir,
        }
    }

    /// Memory-only output for every level. Nothing touches the console or disk.
    pub fn memory_only() -> Self {
        Self {
            use_tty: None,
            use_file: None,
            use_memory: Some(LogLevel::Silly.and_above()),
            log_dir: None,
        }
    }
}

pub struct LoggerLocal {
    /// The name of the application associated with this logger instance.
    app_name: String,
    /// Configuration options determining logging behavior.
    options: LoggerLocalOptions,
    /// The path to the currently active log file, if file logging is enabled.
    current_log_file: Option<PathBuf>,
    /// Serializes file appends across clones of the `Arc`.
    file_lock: Mutex<()>,
    /// Records kept for `use_memory` levels.
    memory: Mutex<Vec<Logrecord>>,
}

impl LoggerLocal {
    /// Rotates log files for a given application and log directory.
    ///
    /// Keeps only the most recent log file (based on the timestamp in the filename)
    /// and deletes older log files for the specified application.
    fn rotate_logs(app_name: &str, log_dir: &Path) {
        let pattern = format!("{}/{}-*.log", log_dir.display(), app_name);
        let entries = match glob(&pattern) {
            Ok(entries) => entries,
            Err(e) => {
                eprintln!("Invalid glob pattern for log rotation {}: {}", pattern, e);
                return;
            }
        };

        let mut log_files: Vec<PathBuf> = entries.flatten().collect();

        // Newest first; the timestamp suffix sorts lexicographically.
        log_files.sort_by(|a, b| b.file_name().cmp(&a.file_name()));

        for old_file in log_files.iter().skip(1) {
            if let Err(e) = std::fs::remove_file(old_file) {
                eprintln!("Error deleting old log file {}: {}", old_file.display(), e);
            }
        }
    }

    /// Creates a new `LoggerLocal` instance.
    ///
    /// If file logging is enabled, it ensures the log directory exists,
    /// rotates old logs, and sets up the current log file path.
    ///
    /// # Arguments
    /// * `app_name` - The name of the application using this logger.
    /// * `options` - Optional `LoggerLocalOptions`. If `None`, TTY and file
    ///   logging are enabled for `Info` and above.
    pub fn new(app_name: String, options: Option<LoggerLocalOptions>) -> Self {
        let opts = options.unwrap_or_else(|| LoggerLocalOptions::with_min_level(LogLevel::Info, None));

        let mut logger = Self {
            app_name: app_name.clone(),
            options: opts,
            current_log_file: None,
            file_lock: Mutex::new(()),
            memory: Mutex::new(Vec::new()),
        };

        if logger.options.use_file.is_some() {
            let log_base_dir = logger
                .options
                .log_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from("./logs"));

            if let Err(e) = std::fs::create_dir_all(&log_base_dir) {
                eprintln!("Error creating log directory {}: {}", log_base_dir.display(), e);
            }

            // The new file does not exist yet, so rotation keeps the newest previous run.
            LoggerLocal::rotate_logs(&app_name, &log_base_dir);

            let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
            let current_log_filename = format!("{}-{}.log", app_name, timestamp);
            logger.current_log_file = Some(log_base_dir.join(current_log_filename));
        }

        logger
    }

    /// The application name attached to every record.
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Path of the file currently written to, if file logging is enabled.
    pub fn current_log_file(&self) -> Option<&Path> {
        self.current_log_file.as_deref()
    }

    /// Logs a message with a specified level, handling TTY output,
    /// file writing and in-memory retention based on the logger's configuration.
    ///
    /// # Arguments
    /// * `log_level` - The numeric log level (0 for Silly up to 6 for Fatal).
    /// * `log_message` - The main message string to be logged.
    /// * `log_extras` - Additional structured data to include in the record.
    pub fn log(&self, log_level: i64, log_message: &str, log_extras: Option<Value>) {
        let mut record = Logrecord::default();
        record.app = self.app_name.clone();
        record.loglevel = log_level;
        record.message = log_message.to_string();
        if let Some(extras) = log_extras {
            record.tags = extras;
        }

        if Self::enabled(&self.options.use_tty, log_level) {
            self.write_tty(&record);
        }

        if Self::enabled(&self.options.use_file, log_level) {
            self.write_file(&record);
        }

        if Self::enabled(&self.options.use_memory, log_level) {
            if let Ok(mut memory) = self.memory.lock() {
                memory.push(record);
            }
        }
    }

    fn enabled(levels: &Option<Vec<i64>>, log_level: i64) -> bool {
        levels.as_ref().map_or(false, |l| l.contains(&log_level))
    }

    fn write_tty(&self, record: &Logrecord) {
        let ts = record.rfc9557.as_str().truecolor(128, 128, 128);
        let app_name_colored = format!("[{}]", self.app_name).truecolor(128, 128, 128);
        let text = record.message.as_str();

        let colored_message = match LogLevel::from_i64(record.loglevel) {
            LogLevel::Fatal => text.bright_white().on_bright_red(),
            LogLevel::Error => text.bright_red(),
            LogLevel::Warn => text.bright_yellow(),
            LogLevel::Info => text.bright_green(),
            LogLevel::Debug => text.bright_white(),
            LogLevel::Trace => text.bright_cyan(),
            LogLevel::Silly => text.blue(),
        };

        // stderr keeps stdout clean for the tracker's own output.
        eprintln!("{}{}\n{}", ts, app_name_colored, colored_message);
        if record.has_tags() {
            if let Ok(tags_str) = serde_json::to_string(&record.tags) {
                eprintln!("{}{}{}", ts, app_name_colored, tags_str.truecolor(128, 128, 128));
            }
        }
    }

    fn write_file(&self, record: &Logrecord) {
        let Some(log_file_path) = &self.current_log_file else {
            return;
        };

        let mut line = format!(
            "{} [{}][{}] {}\n",
            record.rfc9557,
            self.app_name,
            LogLevel::from_i64(record.loglevel),
            record.message
        );
        if record.has_tags() {
            if let Ok(tags_str) = serde_json::to_string(&record.tags) {
                line.push_str(&tags_str);
                line.push('\n');
            }
        }

        let _guard = self.file_lock.lock();
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file_path)
            .and_then(|mut file| file.write_all(line.as_bytes()));
        if let Err(e) = result {
            eprintln!("{}", format!("Error writing log file {}: {}", log_file_path.display(), e).red());
        }
    }

    /// Snapshot of the records retained by the in-memory sink.
    pub fn records(&self) -> Vec<Logrecord> {
        self.memory.lock().map(|m| m.clone()).unwrap_or_default()
    }

    /// Retained records at exactly `level`.
    pub fn records_at(&self, level: LogLevel) -> Vec<Logrecord> {
        self.records()
            .into_iter()
            .filter(|r| r.loglevel == level as i64)
            .collect()
    }

    /// Logs a message at the "Silly" (level 0) log level.
    pub fn silly(&self, log_message: &str, log_extras: Option<Value>) {
        self.log(0, log_message, log_extras);
    }

    /// Logs a message at the "Trace" (level 1) log level.
    pub fn trace(&self, log_message: &str, log_extras: Option<Value>) {
        self.log(1, log_message, log_extras);
    }

    /// Logs a message at the "Debug" (level 2) log level.
    ///
    /// Used for per-request details such as the URL of each page fetched.
    pub fn debug(&self, log_message: &str, log_extras: Option<Value>) {
        self.log(2, log_message, log_extras);
    }

    /// Logs a message at the "Info" (level 3) log level.
    pub fn info(&self, log_message: &str, log_extras: Option<Value>) {
        self.log(3, log_message, log_extras);
    }

    /// Logs a message at the "Warn" (level 4) log level.
    ///
    /// Indicates an unusual event, e.g. a non-200 HTTP status, that does not
    /// stop the application.
    pub fn warn(&self, log_message: &str, log_extras: Option<Value>) {
        self.log(4, log_message, log_extras);
    }

    /// Logs a message at the "Error" (level 5) log level.
    pub fn error(&self, log_message: &str, log_extras: Option<Value>) {
        self.log(5, log_message, log_extras);
    }

    /// Logs a message at the "Fatal" (level 6) log level.
    pub fn fatal(&self, log_message: &str, log_extras: Option<Value>) {
        self.log(6, log_message, log_extras);
    }
}
