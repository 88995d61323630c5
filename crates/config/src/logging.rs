//! Log target selection
//!
//! A configuration can activate any combination of three sinks: console,
//! rotating file, and syslog. Console is a fallback, not an exclusive mode:
//! it is forced on when no other sink is configured, or when the explicit
//! console override tag is present, and is never implicitly suppressed.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Log severity level.
///
/// Matched case-sensitively against the five known names; the resolver
/// falls back to `Info` for anything unrecognized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Notice,
    Error,
    Warning,
    #[default]
    Info,
    Debug,
}

impl Severity {
    /// Parse a severity name; `None` if it is not one of the five known names.
    pub fn from_name(name: &str) -> Option<Severity> {
        match name {
            "notice" => Some(Severity::Notice),
            "error" => Some(Severity::Error),
            "warning" => Some(Severity::Warning),
            "info" => Some(Severity::Info),
            "debug" => Some(Severity::Debug),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Severity::Notice => "notice",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Debug => "debug",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Syslog message classification channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyslogFacility {
    Local0,
    Local1,
    Local2,
    Local3,
    Local4,
    Local5,
    Local6,
    Local7,
}

impl SyslogFacility {
    /// Parse a facility name; `None` for anything outside `local0`..`local7`.
    ///
    /// A failed lookup does not deactivate the syslog sink itself; callers
    /// treat delivery as unconfigured for facility purposes only.
    pub fn from_name(name: &str) -> Option<SyslogFacility> {
        match name {
            "local0" => Some(SyslogFacility::Local0),
            "local1" => Some(SyslogFacility::Local1),
            "local2" => Some(SyslogFacility::Local2),
            "local3" => Some(SyslogFacility::Local3),
            "local4" => Some(SyslogFacility::Local4),
            "local5" => Some(SyslogFacility::Local5),
            "local6" => Some(SyslogFacility::Local6),
            "local7" => Some(SyslogFacility::Local7),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SyslogFacility::Local0 => "local0",
            SyslogFacility::Local1 => "local1",
            SyslogFacility::Local2 => "local2",
            SyslogFacility::Local3 => "local3",
            SyslogFacility::Local4 => "local4",
            SyslogFacility::Local5 => "local5",
            SyslogFacility::Local6 => "local6",
            SyslogFacility::Local7 => "local7",
        }
    }
}

/// Rotating file sink parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLogTarget {
    /// Log file path; the sink is active iff this is non-empty
    pub name: String,
    /// Directory rotated-out files are archived to
    pub archive_directory: String,
    /// Rotation threshold, in megabytes
    pub rotation_size_mb: u32,
    /// Maximum total size of stored files, in bytes
    pub max_size_bytes: u64,
    /// Minimum free disk space to maintain, in bytes
    pub min_free_bytes: u64,
    /// Flush after every record
    pub auto_flush: bool,
}

impl Default for FileLogTarget {
    fn default() -> Self {
        FileLogTarget {
            name: String::new(),
            archive_directory: "archive".to_string(),
            rotation_size_mb: 5,
            max_size_bytes: 16_000_000,
            min_free_bytes: 2_000_000_000,
            auto_flush: false,
        }
    }
}

/// Syslog sink parameters.
///
/// `facility` is `None` when the configured name is absent or unrecognized;
/// the sink is still considered active by address presence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyslogTarget {
    pub address: String,
    pub port: u16,
    pub facility: Option<SyslogFacility>,
}

/// An active logging sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogTarget {
    Console,
    File(FileLogTarget),
    Syslog(SyslogTarget),
}

/// Decide which sinks are active once the file and syslog sections have been
/// resolved.
///
/// Console is forced when no other sink is configured or when the explicit
/// override is present; file and syslog activate independently.
pub fn select_log_targets(
    file: Option<FileLogTarget>,
    syslog: Option<SyslogTarget>,
    console_override: bool,
) -> Vec<LogTarget> {
    let console = (file.is_none() && syslog.is_none()) || console_override;

    let mut targets = Vec::new();
    if let Some(file) = file {
        targets.push(LogTarget::File(file));
    }
    if let Some(syslog) = syslog {
        targets.push(LogTarget::Syslog(syslog));
    }
    if console {
        targets.push(LogTarget::Console);
    }
    targets
}
