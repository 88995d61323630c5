//! Spam filtering rules
//!
//! A header-name-keyed blocklist: messages carrying one of the configured
//! values in the named header are subject to the table-wide action.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::doc::Document;

const DEFAULT_ACTION: &str = "discard";

/// Header-name-to-blocklist mapping plus the default discard actions.
///
/// Keys are lowercased header names; values keep their configured order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpammerRuleTable {
    rules: HashMap<String, Vec<String>>,
    action: String,
    tcp_action: String,
}

impl Default for SpammerRuleTable {
    fn default() -> Self {
        SpammerRuleTable {
            rules: HashMap::new(),
            action: DEFAULT_ACTION.to_string(),
            tcp_action: DEFAULT_ACTION.to_string(),
        }
    }
}

impl SpammerRuleTable {
    /// Blocklisted values for a header; lookup is by the lowercased key
    pub fn values(&self, header: &str) -> Option<&[String]> {
        self.rules.get(header).map(Vec::as_slice)
    }

    /// Configured header names, in no particular order
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Action applied to a matching message received over UDP
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Action applied to a matching message received over TCP
    pub fn tcp_action(&self) -> &str {
        &self.tcp_action
    }
}

/// Build the rule table from the `sip.spammers` section, if present.
///
/// Header blocks with an empty `name` attribute are skipped; duplicate names
/// overwrite earlier entries. The section-level `action` and `tcp-action`
/// attributes each default to `"discard"` and apply to the whole table.
pub fn derive_spammer_rules(doc: &Document) -> SpammerRuleTable {
    let Some(section) = doc.node("drachtio.sip.spammers") else {
        return SpammerRuleTable::default();
    };

    let mut rules = HashMap::new();
    for header in section.children_named("header") {
        let name = header.attr("name").unwrap_or("");
        if name.is_empty() {
            continue;
        }
        let values: Vec<String> = header
            .children()
            .iter()
            .map(|value| value.text())
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .collect();
        rules.insert(name.to_lowercase(), values);
    }

    SpammerRuleTable {
        rules,
        action: section.attr("action").unwrap_or(DEFAULT_ACTION).to_string(),
        tcp_action: section
            .attr("tcp-action")
            .unwrap_or(DEFAULT_ACTION)
            .to_string(),
    }
}
