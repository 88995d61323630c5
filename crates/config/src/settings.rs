//! Resolved settings value types
//!
//! [`ResolvedConfig`] is built once at startup and never mutated afterwards;
//! it can be shared freely across threads without locking. Callers must
//! check [`ResolvedConfig::is_valid`] before trusting any derived field.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::logging::{FileLogTarget, LogTarget, Severity, SyslogTarget};
use crate::spammer::SpammerRuleTable;
use crate::transport::{SipContactEntry, TransportDescriptor};

/// Default admin socket port
pub const DEFAULT_ADMIN_PORT: u16 = 9022;
/// Default admin shared secret
pub const DEFAULT_ADMIN_SECRET: &str = "admin";
/// Default sofia-layer log verbosity
pub const DEFAULT_SOFIA_LOGLEVEL: u32 = 1;

/// Admin socket endpoint.
///
/// The admin section is mandatory: its absence invalidates the whole
/// resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminEndpoint {
    pub port: u16,
    pub address: String,
    pub secret: String,
}

impl Default for AdminEndpoint {
    fn default() -> Self {
        AdminEndpoint {
            port: DEFAULT_ADMIN_PORT,
            address: String::new(),
            secret: DEFAULT_ADMIN_SECRET.to_string(),
        }
    }
}

impl AdminEndpoint {
    /// Check a candidate shared secret presented by an admin client.
    pub fn matches_secret(&self, candidate: &str) -> bool {
        self.secret == candidate
    }
}

/// SIP retransmission timers, in milliseconds.
///
/// All four fields are always present: either parsed or defaulted, never
/// partially missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSet {
    pub t1: u32,
    pub t2: u32,
    pub t4: u32,
    pub t1x64: u32,
}

impl Default for TimerSet {
    fn default() -> Self {
        TimerSet {
            t1: 500,
            t2: 4000,
            t4: 5000,
            t1x64: 32_000,
        }
    }
}

/// TLS key material file paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsFiles {
    pub key_file: String,
    pub cert_file: String,
    pub chain_file: String,
}

impl TlsFiles {
    /// TLS is usable iff both key and cert are configured; a chain file
    /// alone is insufficient.
    pub fn is_configured(&self) -> bool {
        !self.key_file.is_empty() && !self.cert_file.is_empty()
    }
}

/// The server's resolved operational configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedConfig {
    pub(crate) valid: bool,
    pub(crate) admin: Option<AdminEndpoint>,
    pub(crate) contacts: Vec<SipContactEntry>,
    pub(crate) transports: Vec<TransportDescriptor>,
    pub(crate) outbound_proxy: Option<String>,
    pub(crate) tls: TlsFiles,
    pub(crate) timers: TimerSet,
    pub(crate) log_targets: Vec<LogTarget>,
    pub(crate) severity: Severity,
    pub(crate) sofia_loglevel: u32,
    pub(crate) spammers: SpammerRuleTable,
    pub(crate) generate_cdrs: bool,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        ResolvedConfig {
            valid: false,
            admin: None,
            contacts: Vec::new(),
            transports: Vec::new(),
            outbound_proxy: None,
            tls: TlsFiles::default(),
            timers: TimerSet::default(),
            log_targets: Vec::new(),
            severity: Severity::Info,
            sofia_loglevel: DEFAULT_SOFIA_LOGLEVEL,
            spammers: SpammerRuleTable::default(),
            generate_cdrs: false,
        }
    }
}

impl ResolvedConfig {
    /// An invalid result carrying only defaults; returned when the file
    /// cannot be opened or the document cannot be parsed.
    pub(crate) fn invalid() -> Self {
        ResolvedConfig::default()
    }

    /// Whether resolution succeeded; no other field may be trusted when
    /// this is false.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Admin socket endpoint; `None` only when the result is invalid
    pub fn admin(&self) -> Option<&AdminEndpoint> {
        self.admin.as_ref()
    }

    /// Configured SIP contacts, in document order
    pub fn contacts(&self) -> &[SipContactEntry] {
        &self.contacts
    }

    /// Derived transport bindings, in document order
    pub fn transports(&self) -> &[TransportDescriptor] {
        &self.transports
    }

    /// Outbound proxy URL, if one was configured
    pub fn outbound_proxy(&self) -> Option<&str> {
        self.outbound_proxy.as_deref()
    }

    pub fn tls(&self) -> &TlsFiles {
        &self.tls
    }

    pub fn timers(&self) -> TimerSet {
        self.timers
    }

    /// Active logging sinks
    pub fn log_targets(&self) -> &[LogTarget] {
        &self.log_targets
    }

    /// Whether the console sink is active
    pub fn console_target(&self) -> bool {
        self.log_targets
            .iter()
            .any(|target| matches!(target, LogTarget::Console))
    }

    /// The file sink, if active
    pub fn file_target(&self) -> Option<&FileLogTarget> {
        self.log_targets.iter().find_map(|target| match target {
            LogTarget::File(file) => Some(file),
            _ => None,
        })
    }

    /// The syslog sink, if active
    pub fn syslog_target(&self) -> Option<&SyslogTarget> {
        self.log_targets.iter().find_map(|target| match target {
            LogTarget::Syslog(syslog) => Some(syslog),
            _ => None,
        })
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Sofia-layer log verbosity
    pub fn sofia_loglevel(&self) -> u32 {
        self.sofia_loglevel
    }

    pub fn spammers(&self) -> &SpammerRuleTable {
        &self.spammers
    }

    /// Whether call detail records are generated
    pub fn generate_cdrs(&self) -> bool {
        self.generate_cdrs
    }

    /// Emit the effective configuration at info level.
    pub fn log_summary(&self) {
        info!(valid = self.valid, "resolved configuration");
        if let Some(admin) = &self.admin {
            info!(address = %admin.address, port = admin.port, "admin endpoint");
        }
        for transport in &self.transports {
            info!(url = %transport.url, "sip transport");
        }
        info!(
            t1 = self.timers.t1,
            t2 = self.timers.t2,
            t4 = self.timers.t4,
            t1x64 = self.timers.t1x64,
            "sip timers"
        );
        info!(
            severity = %self.severity,
            sofia_loglevel = self.sofia_loglevel,
            console = self.console_target(),
            file = self.file_target().is_some(),
            syslog = self.syslog_target().is_some(),
            "logging"
        );
        info!(
            tls = self.tls.is_configured(),
            cdrs = self.generate_cdrs,
            spammer_rules = self.spammers.len(),
            "features"
        );
    }
}
