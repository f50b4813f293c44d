//! Reply attribution

use std::collections::BTreeSet;
use tenderline_domain::{AttributedReply, ReplyRecord, SendRecord};

/// Maps replies back to the vendors they were sent to
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplyAttributor;

impl ReplyAttributor {
    /// Attribute each reply to every vendor with a matching address
    ///
    /// A reply matches vendor V when its sender address contains, ignoring
    /// case, any non-empty address recorded for V. Every reply is returned
    /// once, in input order, even when nothing matches.
    pub fn attribute(&self, record: &SendRecord, replies: Vec<ReplyRecord>) -> Vec<AttributedReply> {
        let known: Vec<(String, String)> = record
            .vendor_address_pairs
            .iter()
            .map(|pair| (pair.vendor.clone(), pair.address.trim().to_lowercase()))
            .filter(|(_, address)| !address.is_empty())
            .collect();

        replies
            .into_iter()
            .map(|reply| {
                let sender = reply.sender_address.to_lowercase();
                let matched_vendors: BTreeSet<String> = known
                    .iter()
                    .filter(|(_, address)| sender.contains(address.as_str()))
                    .map(|(vendor, _)| vendor.clone())
                    .collect();
                AttributedReply {
                    reply,
                    matched_vendors,
                }
            })
            .collect()
    }
}
