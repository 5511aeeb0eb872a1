use async_trait::async_trait;
use httpmock::prelude::*;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;
use sub_enum::adapters::dns::{DohLookup, FallbackResolver, LookupFailure, LookupStep, ResolverTiming};
use sub_enum::adapters::{build_sources, http};
use sub_enum::domain::ports::SilentProgress;
use sub_enum::utils::style::OutputStyle;
use sub_enum::{Aggregator, Domain, ReportFormat, Reporter, ResolutionResult, Settings, SourceKind};

/// Primary step that never answers, so every lookup goes through DoH.
struct NoAnswerStep;

#[async_trait]
impl LookupStep for NoAnswerStep {
    fn name(&self) -> &str {
        "no-answer"
    }

    async fn lookup_a(&self, _host: &str) -> Result<Ipv4Addr, LookupFailure> {
        Err(LookupFailure::NoAnswer)
    }
}

const CRTSH_PAGE: &str = r#"
<html><body><table><tr><td>
  <table>
    <tr><th>ID</th><th>Logged</th><th>Not Before</th><th>Not After</th><th>Common Name</th></tr>
    <tr><td>1</td><td>-</td><td>-</td><td>-</td><td>www.example.com</td></tr>
    <tr><td>2</td><td>-</td><td>-</td><td>-</td><td>*.api.example.com<br>hostmaster@example.com</td></tr>
  </table>
</td></tr></table>
</body></html>"#;

fn settings_for(server: &MockServer) -> Settings {
    let mut settings = Settings {
        http_timeout: Duration::from_secs(5),
        ..Settings::default()
    };
    settings.endpoints.archive = server.url("/cdx");
    settings.endpoints.crtsh = server.url("/crtsh");
    settings.endpoints.certspotter = server.url("/issuances");
    settings
}

fn doh_resolver(server: &MockServer) -> FallbackResolver<NoAnswerStep, DohLookup> {
    let client = http::build_client(http::DEFAULT_USER_AGENT, Duration::from_secs(5)).unwrap();
    FallbackResolver::new(
        NoAnswerStep,
        DohLookup::new(client, server.url("/resolve")),
        ResolverTiming::default(),
    )
}

#[tokio::test]
async fn test_full_aggregation_against_mocked_sources() {
    let server = MockServer::start_async().await;

    let archive = server
        .mock_async(|when, then| {
            when.method(GET).path("/cdx").query_param("matchType", "domain");
            then.status(200).json_body(serde_json::json!([
                ["original"],
                ["http://www.example.com:80/index.html"],
                ["https://blog.example.com/post?id=1"]
            ]));
        })
        .await;
    let crtsh = server
        .mock_async(|when, then| {
            when.method(GET).path("/crtsh").query_param("q", "%.example.com");
            then.status(200)
                .header("Content-Type", "text/html")
                .body(CRTSH_PAGE);
        })
        .await;
    // certspotter 被限流
    let certspotter = server
        .mock_async(|when, then| {
            when.method(GET).path("/issuances");
            then.status(429);
        })
        .await;

    for (host, address) in [
        ("www.example.com", "93.184.216.34"),
        ("api.example.com", "10.0.0.1"),
    ] {
        server
            .mock_async(move |when, then| {
                when.method(GET).path("/resolve").query_param("name", host);
                then.status(200).json_body(serde_json::json!({
                    "Status": 0,
                    "Answer": [{ "name": host, "type": 1, "data": address }]
                }));
            })
            .await;
    }
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/resolve")
                .query_param("name", "blog.example.com");
            then.status(200).json_body(serde_json::json!({ "Status": 3 }));
        })
        .await;

    let settings = settings_for(&server);
    let aggregator = Aggregator::new(
        build_sources(&settings).unwrap(),
        doh_resolver(&server),
        settings.concurrency,
        Arc::new(SilentProgress),
    );
    let domain = Domain::parse("example.com").unwrap();

    let report = aggregator.aggregate(&domain).await;

    archive.assert_async().await;
    crtsh.assert_async().await;
    certspotter.assert_async().await;

    let rows: Vec<(&str, String)> = report
        .rows
        .iter()
        .map(|row| (row.subdomain.as_str(), row.resolution_display()))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("api", "10.0.0.1".to_string()),
            ("blog", "None".to_string()),
            ("www", "93.184.216.34".to_string()),
        ]
    );
    assert_eq!(report.rows[1].resolution, ResolutionResult::Unresolved);

    let table = Reporter::new(ReportFormat::Table, OutputStyle::Plain)
        .render(&report)
        .unwrap();
    assert!(table.contains("|       api | example.com | 10.0.0.1      |"));
}

#[tokio::test]
async fn test_all_sources_failing_reports_no_data() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/cdx");
            then.status(200).body("");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/crtsh");
            then.status(503);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/issuances");
            then.status(200)
                .json_body(serde_json::json!({ "code": "rate_limited", "message": "slow down" }));
        })
        .await;

    let settings = settings_for(&server);
    let aggregator = Aggregator::new(
        build_sources(&settings).unwrap(),
        doh_resolver(&server),
        2,
        Arc::new(SilentProgress),
    );
    let domain = Domain::parse("example.com").unwrap();

    let report = aggregator.aggregate(&domain).await;

    assert!(report.is_empty());
    let output = Reporter::new(ReportFormat::Table, OutputStyle::Color)
        .render(&report)
        .unwrap();
    assert_eq!(output, "No data available for example.com");
}

#[test]
fn test_passive_dns_addresses_skip_resolution() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/bufferover").query_param("q", ".example.com");
        then.status(200).json_body(serde_json::json!({
            "FDNS_A": ["203.0.113.7,vpn.example.com", "203.0.113.8,example.com"]
        }));
    });
    let doh = server.mock(|when, then| {
        when.method(GET).path("/resolve");
        then.status(200).json_body(serde_json::json!({ "Status": 0 }));
    });

    let mut settings = settings_for(&server);
    settings.sources = vec![SourceKind::Bufferover];
    settings.endpoints.bufferover = server.url("/bufferover");

    let aggregator = Aggregator::new(
        build_sources(&settings).unwrap(),
        doh_resolver(&server),
        2,
        Arc::new(SilentProgress),
    );
    let domain = Domain::parse("example.com").unwrap();

    let report = tokio_test::block_on(aggregator.aggregate(&domain));

    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].subdomain, "vpn");
    assert_eq!(report.rows[0].resolution_display(), "203.0.113.7");
    doh.assert_hits(0);
}
