//! SIP contact and transport derivation
//!
//! Two mutually exclusive document forms, tried in fixed priority order: the
//! legacy single `sip.contact` scalar, then the `sip.contacts` list. Neither
//! form being present is not an error; the caller may supply transports by
//! other means later.

use serde::{Deserialize, Serialize};

use crate::doc::Document;

/// An address-of-record URL at which the server is reachable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SipContactEntry {
    pub url: String,
    /// NAT-facing address advertised for this contact; may be empty
    pub external_ip: String,
}

/// Resolved binding description handed to the network layer to open a
/// listening transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportDescriptor {
    pub url: String,
    /// CIDR of the local network this binding belongs to; may be empty
    pub local_net: String,
    /// NAT-facing address; may be empty
    pub external_ip: String,
}

/// Derive the ordered contact and transport lists from the document.
///
/// The legacy single-contact field wins outright when present; otherwise
/// each `contact` child of the `contacts` list yields one entry and one
/// descriptor, in document order.
pub fn derive_transports(doc: &Document) -> (Vec<SipContactEntry>, Vec<TransportDescriptor>) {
    // old way: a single contact
    if let Some(url) = doc.text_at("drachtio.sip.contact") {
        let contact = SipContactEntry {
            url: url.to_string(),
            external_ip: String::new(),
        };
        let descriptor = TransportDescriptor {
            url: url.to_string(),
            local_net: String::new(),
            external_ip: String::new(),
        };
        return (vec![contact], vec![descriptor]);
    }

    // new way: a parent <contacts> tag containing multiple contacts
    let mut contacts = Vec::new();
    let mut descriptors = Vec::new();
    if let Some(list) = doc.node("drachtio.sip.contacts") {
        for entry in list.children_named("contact") {
            let external_ip = entry.attr("external-ip").unwrap_or("").to_string();
            let local_net = entry.attr("local-net").unwrap_or("").to_string();
            contacts.push(SipContactEntry {
                url: entry.text().to_string(),
                external_ip: external_ip.clone(),
            });
            descriptors.push(TransportDescriptor {
                url: entry.text().to_string(),
                local_net,
                external_ip,
            });
        }
    }
    (contacts, descriptors)
}
