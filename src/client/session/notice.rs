use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeLevel::Info => write!(f, "INFO"),
            NoticeLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// A short-lived message for the user (a toast)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub timestamp: DateTime<Utc>,
    pub level: NoticeLevel,
    pub message: String,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.timestamp.format("%H:%M:%S%.3f"),
            self.level,
            self.message
        )
    }
}

/// Bounded queue of notices waiting to be shown; the oldest is dropped first
#[derive(Debug)]
pub struct NoticeLog {
    entries: VecDeque<Notice>,
    max_entries: usize,
}

impl NoticeLog {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries: max_entries.max(1),
        }
    }

    pub fn push(&mut self, level: NoticeLevel, message: impl Into<String>) {
        let notice = Notice {
            timestamp: Utc::now(),
            level,
            message: message.into(),
        };

        match level {
            NoticeLevel::Info => tracing::info!("[NOTICE] {}", notice.message),
            NoticeLevel::Error => tracing::warn!("[NOTICE] {}", notice.message),
        }

        self.entries.push_back(notice);
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Info, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Error, message);
    }

    /// Remove and return every pending notice, oldest first
    pub fn drain(&mut self) -> Vec<Notice> {
        self.entries.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for NoticeLog {
    fn default() -> Self {
        Self::new(32)
    }
}
