//! End-to-end resolution tests over complete configuration documents.

use std::io::Write;

use pretty_assertions::assert_eq;

use drachtio_config::{resolve, resolve_str, LogTarget, Severity, SyslogFacility};

const FULL_DOC: &str = r#"<drachtio>
  <admin port="9023" secret="s3cret">0.0.0.0</admin>
  <sip>
    <contacts>
      <contact external-ip="35.0.0.1" local-net="10.0.0.0/8">sip:10.0.0.2;transport=udp,tcp</contact>
      <contact>sip:10.0.0.2:5061;transport=tls</contact>
    </contacts>
    <outbound-proxy>sip:proxy.example.com</outbound-proxy>
    <tls>
      <key-file>/etc/ssl/key.pem</key-file>
      <cert-file>/etc/ssl/cert.pem</cert-file>
      <chain-file>/etc/ssl/chain.pem</chain-file>
    </tls>
    <timers>
      <t1>250</t1>
      <t2>2000</t2>
    </timers>
    <spammers action="reject" tcp-action="discard">
      <header name="X-Abuse">
        <value>spam-bot</value>
        <value>flooder</value>
      </header>
      <header name="User-Agent">
        <value>sipcli</value>
      </header>
    </spammers>
  </sip>
  <logging>
    <loglevel>debug</loglevel>
    <sofia-loglevel>3</sofia-loglevel>
    <file>
      <name>/var/log/drachtio/drachtio.log</name>
      <archive>/var/log/drachtio/archive</archive>
      <size>50</size>
      <auto-flush>true</auto-flush>
    </file>
    <syslog>
      <address>127.0.0.1</address>
      <port>514</port>
      <facility>local6</facility>
    </syslog>
  </logging>
  <cdrs>true</cdrs>
</drachtio>"#;

fn wrap(body: &str) -> String {
    format!(
        "<drachtio><admin port=\"9022\">127.0.0.1</admin>{}</drachtio>",
        body
    )
}

#[test]
fn full_document_resolves_every_section() {
    let config = resolve_str(FULL_DOC, false);
    assert!(config.is_valid());

    let admin = config.admin().unwrap();
    assert_eq!(admin.port, 9023);
    assert_eq!(admin.address, "0.0.0.0");
    assert!(admin.matches_secret("s3cret"));
    assert!(!admin.matches_secret("admin"));

    assert_eq!(config.contacts().len(), 2);
    assert_eq!(config.transports().len(), 2);
    assert_eq!(config.transports()[0].url, "sip:10.0.0.2;transport=udp,tcp");
    assert_eq!(config.transports()[0].local_net, "10.0.0.0/8");
    assert_eq!(config.transports()[0].external_ip, "35.0.0.1");
    assert_eq!(config.transports()[1].url, "sip:10.0.0.2:5061;transport=tls");
    assert_eq!(config.transports()[1].local_net, "");

    assert_eq!(config.outbound_proxy(), Some("sip:proxy.example.com"));

    assert!(config.tls().is_configured());
    assert_eq!(config.tls().chain_file, "/etc/ssl/chain.pem");

    // configured timers apply, the rest keep their defaults
    assert_eq!(config.timers().t1, 250);
    assert_eq!(config.timers().t2, 2000);
    assert_eq!(config.timers().t4, 5000);
    assert_eq!(config.timers().t1x64, 32_000);

    assert_eq!(config.severity(), Severity::Debug);
    assert_eq!(config.sofia_loglevel(), 3);

    let file = config.file_target().unwrap();
    assert_eq!(file.name, "/var/log/drachtio/drachtio.log");
    assert_eq!(file.archive_directory, "/var/log/drachtio/archive");
    assert_eq!(file.rotation_size_mb, 50);
    assert!(file.auto_flush);

    let syslog = config.syslog_target().unwrap();
    assert_eq!(syslog.address, "127.0.0.1");
    assert_eq!(syslog.port, 514);
    assert_eq!(syslog.facility, Some(SyslogFacility::Local6));

    // both sinks configured and no override tag
    assert!(!config.console_target());

    assert_eq!(config.spammers().action(), "reject");
    assert_eq!(config.spammers().tcp_action(), "discard");
    assert_eq!(
        config.spammers().values("x-abuse").unwrap(),
        &["spam-bot".to_string(), "flooder".to_string()]
    );

    assert!(config.generate_cdrs());
}

#[test]
fn resolving_the_same_document_twice_is_idempotent() {
    assert_eq!(resolve_str(FULL_DOC, false), resolve_str(FULL_DOC, false));
}

#[test]
fn missing_admin_section_invalidates_the_result() {
    let config = resolve_str(
        "<drachtio><sip><contact>sip:10.0.0.2</contact></sip></drachtio>",
        false,
    );
    assert!(!config.is_valid());
    assert!(config.admin().is_none());
    // the rest of the document is still resolved for diagnostics
    assert_eq!(config.transports().len(), 1);
}

#[test]
fn admin_attributes_default_when_absent() {
    let config = resolve_str("<drachtio><admin>127.0.0.1</admin></drachtio>", false);
    assert!(config.is_valid());
    let admin = config.admin().unwrap();
    assert_eq!(admin.port, 9022);
    assert_eq!(admin.address, "127.0.0.1");
    assert!(admin.matches_secret("admin"));
}

#[test]
fn legacy_contact_yields_exactly_one_transport() {
    let config = resolve_str(
        &wrap("<sip><contact>sip:10.0.0.2;transport=udp</contact></sip>"),
        false,
    );
    assert_eq!(config.contacts().len(), 1);
    assert_eq!(config.transports().len(), 1);
    assert_eq!(config.contacts()[0].url, "sip:10.0.0.2;transport=udp");
    assert_eq!(config.contacts()[0].external_ip, "");
    assert_eq!(config.transports()[0].local_net, "");
    assert_eq!(config.transports()[0].external_ip, "");
}

#[test]
fn legacy_contact_takes_priority_over_the_list() {
    let config = resolve_str(
        &wrap(
            "<sip>
               <contact>sip:legacy</contact>
               <contacts><contact>sip:a</contact><contact>sip:b</contact></contacts>
             </sip>",
        ),
        false,
    );
    assert_eq!(config.transports().len(), 1);
    assert_eq!(config.transports()[0].url, "sip:legacy");
}

#[test]
fn contact_list_preserves_document_order() {
    let config = resolve_str(
        &wrap(
            "<sip><contacts>
               <contact>sip:a</contact>
               <contact>sip:b</contact>
               <contact>sip:c</contact>
             </contacts></sip>",
        ),
        false,
    );
    let urls: Vec<&str> = config
        .transports()
        .iter()
        .map(|transport| transport.url.as_str())
        .collect();
    assert_eq!(urls, vec!["sip:a", "sip:b", "sip:c"]);
}

#[test]
fn absent_contact_forms_are_not_an_error() {
    let config = resolve_str(&wrap("<sip/>"), false);
    assert!(config.is_valid());
    assert!(config.contacts().is_empty());
    assert!(config.transports().is_empty());
}

#[test]
fn omitted_timers_resolve_to_defaults() {
    let config = resolve_str(&wrap(""), false);
    assert_eq!(config.timers().t1, 500);
    assert_eq!(config.timers().t2, 4000);
    assert_eq!(config.timers().t4, 5000);
    assert_eq!(config.timers().t1x64, 32_000);
}

#[test]
fn malformed_timer_reverts_all_four_to_defaults() {
    let config = resolve_str(
        &wrap("<sip><timers><t1>250</t1><t2>soon</t2></timers></sip>"),
        false,
    );
    // the well-formed t1 is discarded along with the malformed t2
    assert_eq!(config.timers().t1, 500);
    assert_eq!(config.timers().t2, 4000);
    assert_eq!(config.timers().t4, 5000);
    assert_eq!(config.timers().t1x64, 32_000);
    // local recovery only; validity is unaffected
    assert!(config.is_valid());
}

#[test]
fn console_is_forced_when_no_other_sink_is_configured() {
    let config = resolve_str(&wrap(""), false);
    assert_eq!(config.log_targets(), &[LogTarget::Console]);
}

#[test]
fn console_is_not_forced_when_a_file_sink_exists() {
    let config = resolve_str(
        &wrap("<logging><file><name>/var/log/sip.log</name></file></logging>"),
        false,
    );
    assert!(!config.console_target());
    assert!(config.file_target().is_some());
}

#[test]
fn console_override_tag_forces_console_alongside_other_sinks() {
    let config = resolve_str(
        &wrap("<logging><console/><file><name>/var/log/sip.log</name></file></logging>"),
        false,
    );
    assert!(config.console_target());
    assert!(config.file_target().is_some());
}

#[test]
fn file_sink_parameters_default_individually() {
    let config = resolve_str(
        &wrap("<logging><file><name>/var/log/sip.log</name></file></logging>"),
        false,
    );
    let file = config.file_target().unwrap();
    assert_eq!(file.archive_directory, "archive");
    assert_eq!(file.rotation_size_mb, 5);
    assert_eq!(file.max_size_bytes, 16_000_000);
    assert_eq!(file.min_free_bytes, 2_000_000_000);
    assert!(!file.auto_flush);
}

#[test]
fn file_sink_reads_the_irregular_min_free_space_tag() {
    let config = resolve_str(
        &wrap(
            "<logging><file>
               <name>/var/log/sip.log</name>
               <maxSize>32000000</maxSize>
               <c>1000000</c>
             </file></logging>",
        ),
        false,
    );
    let file = config.file_target().unwrap();
    assert_eq!(file.max_size_bytes, 32_000_000);
    assert_eq!(file.min_free_bytes, 1_000_000);
}

#[test]
fn syslog_sink_requires_an_address() {
    let config = resolve_str(
        &wrap("<logging><syslog><port>514</port></syslog></logging>"),
        false,
    );
    assert!(config.syslog_target().is_none());
    assert!(config.console_target());
}

#[test]
fn unknown_syslog_facility_keeps_the_sink_active() {
    let config = resolve_str(
        &wrap(
            "<logging><syslog>
               <address>127.0.0.1</address>
               <facility>mail</facility>
             </syslog></logging>",
        ),
        false,
    );
    let syslog = config.syslog_target().unwrap();
    assert_eq!(syslog.address, "127.0.0.1");
    assert_eq!(syslog.port, 0);
    assert_eq!(syslog.facility, None);
}

#[test]
fn unrecognized_loglevel_falls_back_to_info() {
    for level in ["verbose", "DEBUG", "Notice", ""] {
        let config = resolve_str(
            &wrap(&format!("<logging><loglevel>{}</loglevel></logging>", level)),
            false,
        );
        assert_eq!(config.severity(), Severity::Info, "loglevel {:?}", level);
    }
    let config = resolve_str(&wrap("<logging><loglevel>warning</loglevel></logging>"), false);
    assert_eq!(config.severity(), Severity::Warning);
}

#[test]
fn cdr_flag_accepts_case_insensitive_true_and_yes() {
    for truthy in ["true", "TRUE", "yes", "Yes"] {
        let config = resolve_str(&wrap(&format!("<cdrs>{}</cdrs>", truthy)), false);
        assert!(config.generate_cdrs(), "cdrs {:?}", truthy);
    }
    for falsy in ["0", "", "no", "enabled"] {
        let config = resolve_str(&wrap(&format!("<cdrs>{}</cdrs>", falsy)), false);
        assert!(!config.generate_cdrs(), "cdrs {:?}", falsy);
    }
    let config = resolve_str(&wrap(""), false);
    assert!(!config.generate_cdrs());
}

#[test]
fn spammer_headers_are_retrievable_only_under_lowercased_names() {
    let config = resolve_str(FULL_DOC, false);
    assert!(config.spammers().values("x-abuse").is_some());
    assert!(config.spammers().values("X-Abuse").is_none());
    assert_eq!(
        config.spammers().values("user-agent").unwrap(),
        &["sipcli".to_string()]
    );
}

#[test]
fn tls_is_enabled_only_with_both_key_and_cert() {
    let config = resolve_str(
        &wrap("<sip><tls><chain-file>/etc/ssl/chain.pem</chain-file></tls></sip>"),
        false,
    );
    assert!(!config.tls().is_configured());

    let config = resolve_str(
        &wrap(
            "<sip><tls>
               <key-file>/etc/ssl/key.pem</key-file>
               <cert-file>/etc/ssl/cert.pem</cert-file>
             </tls></sip>",
        ),
        false,
    );
    assert!(config.tls().is_configured());
    assert_eq!(config.tls().chain_file, "");
}

#[test]
fn malformed_documents_resolve_invalid() {
    let config = resolve_str("<drachtio><admin>127.0.0.1", false);
    assert!(!config.is_valid());

    let config = resolve_str("", false);
    assert!(!config.is_valid());
}

#[test]
fn missing_file_resolves_invalid() {
    let config = resolve("/nonexistent/drachtio.conf.xml", false);
    assert!(!config.is_valid());
    assert!(config.admin().is_none());
}

#[test]
fn resolves_from_a_file_on_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(FULL_DOC.as_bytes()).unwrap();

    let config = resolve(file.path(), true);
    assert!(config.is_valid());
    assert_eq!(config.admin().unwrap().port, 9023);
    assert_eq!(config, resolve_str(FULL_DOC, true));
}
