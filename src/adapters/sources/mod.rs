pub mod archive;
pub mod bufferover;
pub mod certspotter;
pub mod crtsh;
pub mod virustotal;

use crate::config::SourceEndpoints;
use crate::domain::model::SourceKind;
use crate::domain::ports::SourceAdapter;
use reqwest::Client;

pub use archive::ArchiveSource;
pub use bufferover::BufferOverSource;
pub use certspotter::CertSpotterSource;
pub use crtsh::CrtShSource;
pub use virustotal::VirusTotalSource;

/// Builds the adapter for `kind`, pointed at its configured endpoint.
pub fn build_source(
    kind: SourceKind,
    client: Client,
    endpoints: &SourceEndpoints,
) -> Box<dyn SourceAdapter> {
    let endpoint = endpoints.for_kind(kind).to_string();
    match kind {
        SourceKind::Archive => Box::new(ArchiveSource::with_endpoint(client, endpoint)),
        SourceKind::Crtsh => Box::new(CrtShSource::with_endpoint(client, endpoint)),
        SourceKind::Certspotter => Box::new(CertSpotterSource::with_endpoint(client, endpoint)),
        SourceKind::Bufferover => Box::new(BufferOverSource::with_endpoint(client, endpoint)),
        SourceKind::Virustotal => Box::new(VirusTotalSource::with_endpoint(client, endpoint)),
    }
}
