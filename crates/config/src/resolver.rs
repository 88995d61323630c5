//! Configuration resolution
//!
//! Walks the parsed document once, applies every default and precedence
//! policy, and assembles an immutable [`ResolvedConfig`]. Resolution never
//! propagates an error past its boundary: open and parse failures are
//! logged and captured in the validity flag, and everything below that
//! degrades to a default value.
//!
//! Resolution is deterministic: the same document always yields the same
//! result.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use tracing::{error, warn};

use crate::doc::Document;
use crate::error::{Error, Result};
use crate::logging::{select_log_targets, FileLogTarget, Severity, SyslogFacility, SyslogTarget};
use crate::settings::{
    AdminEndpoint, ResolvedConfig, TimerSet, TlsFiles, DEFAULT_ADMIN_PORT, DEFAULT_ADMIN_SECRET,
    DEFAULT_SOFIA_LOGLEVEL,
};
use crate::spammer::derive_spammer_rules;
use crate::transport::derive_transports;

/// Resolve the configuration file at `path`.
///
/// `daemonized` suppresses the human-readable warning emitted on a
/// malformed timer value; it has no other effect.
pub fn resolve(path: impl AsRef<Path>, daemonized: bool) -> ResolvedConfig {
    let path = path.as_ref();
    let input = match fs::read_to_string(path) {
        Ok(input) => input,
        Err(source) => {
            error!(
                "{}",
                Error::FileOpen {
                    path: path.to_path_buf(),
                    source,
                }
            );
            return ResolvedConfig::invalid();
        }
    };
    resolve_str(&input, daemonized)
}

/// Resolve a configuration document from its textual form.
pub fn resolve_str(input: &str, daemonized: bool) -> ResolvedConfig {
    match Document::parse(input) {
        Ok(doc) => resolve_document(&doc, daemonized),
        Err(err) => {
            error!("error reading configuration: {err}");
            ResolvedConfig::invalid()
        }
    }
}

/// Resolve an already-parsed document.
///
/// This is the pure core: the admin section is mandatory and its absence
/// forces the validity flag false, but every other field is still resolved
/// so diagnostics can report on the rest of the document.
pub fn resolve_document(doc: &Document, daemonized: bool) -> ResolvedConfig {
    let (admin, valid) = match resolve_admin(doc) {
        Ok(admin) => (Some(admin), true),
        Err(err) => {
            error!("{err}; the admin section is required to provide admin socket details");
            (None, false)
        }
    };

    let (contacts, transports) = derive_transports(doc);

    let outbound_proxy = doc
        .text_at("drachtio.sip.outbound-proxy")
        .filter(|url| !url.is_empty())
        .map(str::to_string);

    let tls = TlsFiles {
        key_file: text_or_empty(doc, "drachtio.sip.tls.key-file"),
        cert_file: text_or_empty(doc, "drachtio.sip.tls.cert-file"),
        chain_file: text_or_empty(doc, "drachtio.sip.tls.chain-file"),
    };

    let timers = resolve_timers(doc, daemonized);

    let sofia_loglevel = parse_or(
        doc.text_at("drachtio.logging.sofia-loglevel"),
        DEFAULT_SOFIA_LOGLEVEL,
    );

    let file = resolve_file_target(doc);
    let syslog = resolve_syslog_target(doc);
    let console_override = doc.node("drachtio.logging.console").is_some();
    let log_targets = select_log_targets(file, syslog, console_override);

    let severity = doc
        .text_at("drachtio.logging.loglevel")
        .and_then(Severity::from_name)
        .unwrap_or(Severity::Info);

    let spammers = derive_spammer_rules(doc);

    let generate_cdrs = matches!(
        doc.text_at("drachtio.cdrs")
            .map(str::to_lowercase)
            .as_deref(),
        Some("true") | Some("yes")
    );

    ResolvedConfig {
        valid,
        admin,
        contacts,
        transports,
        outbound_proxy,
        tls,
        timers,
        log_targets,
        severity,
        sofia_loglevel,
        spammers,
        generate_cdrs,
    }
}

fn resolve_admin(doc: &Document) -> Result<AdminEndpoint> {
    let node = doc
        .node("drachtio.admin")
        .ok_or(Error::MissingSection("admin"))?;
    Ok(AdminEndpoint {
        port: parse_or(node.attr("port"), DEFAULT_ADMIN_PORT),
        address: node.text().to_string(),
        secret: node.attr("secret").unwrap_or(DEFAULT_ADMIN_SECRET).to_string(),
    })
}

/// A malformed value reverts all four timers to the built-in defaults; this
/// never affects validity.
fn resolve_timers(doc: &Document, daemonized: bool) -> TimerSet {
    let defaults = TimerSet::default();
    let Some(section) = doc.node("drachtio.sip.timers") else {
        return defaults;
    };

    let mut malformed = false;
    let mut timer = |name: &str, default: u32| match section.child_text(name) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            malformed = true;
            default
        }),
    };

    let timers = TimerSet {
        t1: timer("t1", defaults.t1),
        t2: timer("t2", defaults.t2),
        t4: timer("t4", defaults.t4),
        t1x64: timer("t1x64", defaults.t1x64),
    };

    if malformed {
        if !daemonized {
            warn!("invalid timer configuration; retaining default timer values");
        }
        return defaults;
    }
    timers
}

/// The file sink activates only on a non-empty file name.
fn resolve_file_target(doc: &Document) -> Option<FileLogTarget> {
    let section = doc.node("drachtio.logging.file")?;
    let name = section.child_text("name").unwrap_or("");
    if name.is_empty() {
        return None;
    }

    let mut target = FileLogTarget {
        name: name.to_string(),
        ..FileLogTarget::default()
    };
    if let Some(archive) = section.child_text("archive") {
        target.archive_directory = archive.to_string();
    }
    target.rotation_size_mb = parse_or(section.child_text("size"), target.rotation_size_mb);
    target.max_size_bytes = parse_or(section.child_text("maxSize"), target.max_size_bytes);
    // the minimum-free-space tag is irregular but fixed; external compatibility
    target.min_free_bytes = parse_or(section.child_text("c"), target.min_free_bytes);
    target.auto_flush = parse_bool_or(section.child_text("auto-flush"), target.auto_flush);
    Some(target)
}

/// The syslog sink activates only on a non-empty address; an unrecognized
/// facility name leaves the sink active with no facility.
fn resolve_syslog_target(doc: &Document) -> Option<SyslogTarget> {
    let section = doc.node("drachtio.logging.syslog")?;
    let address = section.child_text("address").unwrap_or("");
    if address.is_empty() {
        return None;
    }
    Some(SyslogTarget {
        address: address.to_string(),
        port: parse_or(section.child_text("port"), 0),
        facility: section
            .child_text("facility")
            .and_then(SyslogFacility::from_name),
    })
}

fn text_or_empty(doc: &Document, path: &str) -> String {
    doc.text_at(path).unwrap_or("").to_string()
}

/// Absent and unparsable values both resolve to the default.
fn parse_or<T: FromStr>(text: Option<&str>, default: T) -> T {
    text.and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_bool_or(text: Option<&str>, default: bool) -> bool {
    match text.map(|raw| raw.trim().to_ascii_lowercase()) {
        Some(raw) => match raw.as_str() {
            "true" | "1" => true,
            "false" | "0" => false,
            _ => default,
        },
        None => default,
    }
}
