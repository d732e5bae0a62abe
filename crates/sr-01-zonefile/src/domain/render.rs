//! Zone-file text rendering.

use super::record::SubdomainRecord;
use shared_types::UriEntry;

pub const DEFAULT_TTL: u32 = 3600;

/// A zone file under construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZoneFile {
    pub origin: String,
    pub ttl: u32,
    pub txt: Vec<SubdomainRecord>,
    pub uri: Vec<UriEntry>,
}

impl ZoneFile {
    pub fn new(origin: impl Into<String>, uri: Vec<UriEntry>) -> Self {
        Self {
            origin: origin.into(),
            ttl: DEFAULT_TTL,
            txt: Vec::new(),
            uri,
        }
    }

    /// Headers, then TXT records, then URI records.
    pub fn render(&self) -> String {
        let mut out = self.header();
        for record in &self.txt {
            out.push_str(&txt_line(record));
        }
        for entry in &self.uri {
            out.push_str(&uri_line(entry));
        }
        out
    }

    /// `$ORIGIN` and `$TTL` lines.
    pub fn header(&self) -> String {
        format!("$ORIGIN {}\n$TTL {}\n", self.origin, self.ttl)
    }

    /// Rendered size of everything except TXT records.
    pub fn fixed_len(&self) -> usize {
        self.header().len() + self.uri.iter().map(|e| uri_line(e).len()).sum::<usize>()
    }
}

pub(crate) fn txt_line(record: &SubdomainRecord) -> String {
    let strings: Vec<String> = record.txt.iter().map(|s| format!("\"{}\"", s)).collect();
    format!("{}\tIN\tTXT\t{}\n", record.name, strings.join(" "))
}

pub(crate) fn uri_line(entry: &UriEntry) -> String {
    format!(
        "{}\tIN\tURI\t{}\t{}\t\"{}\"\n",
        entry.name, entry.priority, entry.weight, entry.target
    )
}
