use crate::domain::model::{SourceError, SourceKind};
use crate::domain::ports::ProgressReporter;
use crate::utils::style::{self, OutputStyle};

/// Prints progress lines to stdout as discovery proceeds.
#[derive(Debug, Clone, Copy)]
pub struct TerminalProgress {
    style: OutputStyle,
}

impl TerminalProgress {
    pub fn new(style: OutputStyle) -> Self {
        Self { style }
    }
}

pub fn banner(style: OutputStyle) -> String {
    let title = format!("sub-enum v{}", env!("CARGO_PKG_VERSION"));
    format!(
        "{}\n{}",
        style::accent(&title, style),
        style::muted("passive subdomain enumeration and resolution", style)
    )
}

pub fn source_header(kind: SourceKind, style: OutputStyle) -> String {
    style::heading(&format!("[ Trying {} ]", kind.label()), style)
}

pub fn discovered_line(name: &str, style: OutputStyle) -> String {
    format!(
        "{}  Discovered: {}",
        style::processing_marker(style),
        style::bold(name, style)
    )
}

pub fn failure_line(kind: SourceKind, error: &SourceError, style: OutputStyle) -> String {
    format!("{}  {}: {}", style::warning_marker(style), kind, error)
}

pub fn slow_lookup_line(host: &str, style: OutputStyle) -> String {
    format!(
        "{}  DNS lookup for {} taking longer than expected...trying DNS-over-HTTPS",
        style::warning_marker(style),
        host
    )
}

impl ProgressReporter for TerminalProgress {
    fn source_started(&self, kind: SourceKind) {
        println!("\n{}", source_header(kind, self.style));
    }

    fn discovered(&self, name: &str) {
        println!("{}", discovered_line(name, self.style));
    }

    fn source_failed(&self, kind: SourceKind, error: &SourceError) {
        println!("{}", failure_line(kind, error, self.style));
    }

    fn lookups_started(&self, candidates: usize) {
        let text = format!(
            "[ Performing Lookups ({} names) -- takes a little longer ]",
            candidates
        );
        println!("\n{}", style::heading(&text, self.style));
    }

    fn slow_lookup(&self, host: &str) {
        println!("{}", slow_lookup_line(host, self.style));
    }
}
