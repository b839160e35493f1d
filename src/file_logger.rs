use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;

struct DailyFile {
    day: String,
    file: File,
}

/// Append-only audit log, one file per calendar day under the log
/// directory. Lines are mirrored to stdout.
pub struct FileLogger {
    dir: PathBuf,
    current: Mutex<DailyFile>,
}

impl FileLogger {
    pub fn new(dir: &str) -> Result<Self, std::io::Error> {
        let dir = PathBuf::from(dir);
        std::fs::create_dir_all(&dir)?;

        let day = Local::now().format("%Y-%m-%d").to_string();
        let file = Self::open_day(&dir, &day)?;

        Ok(Self {
            dir,
            current: Mutex::new(DailyFile { day, file }),
        })
    }

    fn open_day(dir: &Path, day: &str) -> Result<File, std::io::Error> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(format!("{day}.log")))
    }

    pub fn log(&self, action: &str, details: &str) {
        let now = Local::now();
        let day = now.format("%Y-%m-%d").to_string();
        let line = format!(
            "[{}] [{}] {}\n",
            now.format("%Y-%m-%d %H:%M:%S"),
            action,
            details
        );

        // Mirror to stdout for Docker logs
        print!("{}", line);

        if let Ok(mut current) = self.current.lock() {
            if current.day != day {
                if let Ok(file) = Self::open_day(&self.dir, &day) {
                    current.day = day;
                    current.file = file;
                }
            }
            let _ = current.file.write_all(line.as_bytes());
            let _ = current.file.flush();
        }
    }

    pub fn log_ready(&self) {
        self.log("READY", "Bot is ready.");
    }

    pub fn log_message_stored(&self, user_id: u64, message: &str) {
        self.log(
            "MESSAGE",
            &format!("New message added user_id: {user_id}, message: \"{message}\""),
        );
    }

    pub fn log_permission(&self, user_id: u64, granted: bool) {
        let details = if granted {
            format!("User {user_id} gave permission to store data.")
        } else {
            format!("User {user_id} removed permission to store data.")
        };
        self.log("PERMISSION", &details);
    }

    pub fn log_purge(&self, user_id: u64, removed: usize) {
        self.log(
            "PURGE",
            &format!("User {user_id} requested to remove all their data ({removed} messages)."),
        );
    }

    pub fn log_simulation(&self, user_id: u64, target_id: u64, outcome: &str) {
        self.log(
            "SIMULATE",
            &format!("User {user_id} requested a simulation of {target_id}, got \"{outcome}\"."),
        );
    }

    pub fn log_error(&self, error: &str) {
        self.log("ERROR", error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_appends_to_daily_file() {
        let dir = tempfile::tempdir().unwrap();
        let logger = FileLogger::new(dir.path().to_str().unwrap()).unwrap();
        logger.log("TEST", "first");
        logger.log("TEST", "second");

        let day = Local::now().format("%Y-%m-%d").to_string();
        let contents = std::fs::read_to_string(dir.path().join(format!("{day}.log"))).unwrap();
        assert!(contents.contains("[TEST] first"));
        assert!(contents.contains("[TEST] second"));
        assert_eq!(contents.lines().count(), 2);
    }
}
