//! Configuration resolution for the drachtio SIP server
//!
//! This crate turns a hierarchical, human-edited configuration document into
//! an immutable, strongly-typed [`ResolvedConfig`] consumed by the rest of
//! the server: the admin interface, the SIP transport layer, the logging
//! pipeline, CDR generation, and spam filtering.
//!
//! Resolution happens once at process startup and is a single synchronous
//! pass. Failures never escape [`resolve`]: a missing file, a malformed
//! document, or an absent admin section produce a result whose
//! [`ResolvedConfig::is_valid`] is false, with the diagnostic logged.
//! Everything else — absent optional sections, unparsable scalars — degrades
//! to a documented default.
//!
//! ## Example
//!
//! ```rust
//! use drachtio_config::resolve_str;
//!
//! let config = resolve_str(
//!     r#"<drachtio>
//!          <admin port="9022" secret="admin">127.0.0.1</admin>
//!          <sip>
//!            <contact>sip:10.0.0.2;transport=udp</contact>
//!          </sip>
//!        </drachtio>"#,
//!     false,
//! );
//!
//! assert!(config.is_valid());
//! assert_eq!(config.transports().len(), 1);
//! assert_eq!(config.timers().t1, 500);
//! ```

pub mod doc;
pub mod error;
pub mod logging;
pub mod resolver;
pub mod settings;
pub mod spammer;
pub mod transport;

pub use doc::{Document, Node};
pub use error::{Error, Result};
pub use logging::{
    select_log_targets, FileLogTarget, LogTarget, Severity, SyslogFacility, SyslogTarget,
};
pub use resolver::{resolve, resolve_document, resolve_str};
pub use settings::{AdminEndpoint, ResolvedConfig, TimerSet, TlsFiles};
pub use spammer::{derive_spammer_rules, SpammerRuleTable};
pub use transport::{derive_transports, SipContactEntry, TransportDescriptor};
