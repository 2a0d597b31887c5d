//! Per-publisher failure isolation across real backend sinks.

use buildpulse::publisher::{
    DocumentStorePublisherConfiguration, InfluxDbPublisherConfiguration, PublisherConfiguration,
    PublisherKind, PublisherRouter, PushGatewayPublisherConfiguration,
};
use buildpulse::error::PublishError;

use super::test_utils::{capture_logs, failed_clean_report};

#[tokio::test]
async fn rejected_and_unreachable_backends_do_not_block_healthy_one() {
    let (logs, _guard) = capture_logs();
    let mut influx = mockito::Server::new_async().await;
    let mut documents = mockito::Server::new_async().await;

    let rejected = influx
        .mock("POST", "/write")
        .match_query(mockito::Matcher::Any)
        .with_status(500)
        .with_body("database not found")
        .expect(1)
        .create_async()
        .await;
    let tasks = documents
        .mock("POST", "/tracking/tasks")
        .with_status(201)
        .expect(1)
        .create_async()
        .await;
    let builds = documents
        .mock("POST", "/tracking/builds")
        .with_status(201)
        .expect(1)
        .create_async()
        .await;

    let publishers = vec![
        PublisherConfiguration::InfluxDb(InfluxDbPublisherConfiguration::new(
            influx.url(),
            "tracking",
        )),
        PublisherConfiguration::PushGateway(PushGatewayPublisherConfiguration::new(
            "http://127.0.0.1:1",
            "tracking",
        )),
        PublisherConfiguration::DocumentStore(DocumentStorePublisherConfiguration::new(
            documents.url(),
            "tracking",
        )),
    ];

    let summary = PublisherRouter::default()
        .publish(&failed_clean_report(), &publishers)
        .await;

    assert_eq!(summary.attempted(), 3);
    assert_eq!(summary.delivered, vec![PublisherKind::DocumentStore]);
    assert_eq!(summary.failed.len(), 2);

    let influx_failure = summary
        .failed
        .iter()
        .find(|f| f.publisher == PublisherKind::InfluxDb)
        .expect("influx failure recorded");
    assert!(matches!(
        influx_failure.error,
        PublishError::Rejected { status: 500, .. }
    ));
    let gateway_failure = summary
        .failed
        .iter()
        .find(|f| f.publisher == PublisherKind::PushGateway)
        .expect("push gateway failure recorded");
    assert!(matches!(
        gateway_failure.error,
        PublishError::Transport { .. }
    ));

    rejected.assert_async().await;
    tasks.assert_async().await;
    builds.assert_async().await;

    let logs = logs.contents();
    assert!(logs.contains("Publisher failed"));
    assert!(logs.contains("InfluxDbPublisher"));
    assert!(logs.contains("PushGatewayPublisher"));
    assert!(logs.contains("Report published"));
}

#[tokio::test]
async fn invalid_backend_configuration_fails_only_that_publisher() {
    let publishers = vec![
        PublisherConfiguration::InfluxDb(InfluxDbPublisherConfiguration::new(
            "not a url",
            "tracking",
        )),
        PublisherConfiguration::Output(Default::default()),
    ];

    let summary = PublisherRouter::default()
        .publish(&failed_clean_report(), &publishers)
        .await;

    assert_eq!(summary.delivered, vec![PublisherKind::Output]);
    assert_eq!(summary.failed.len(), 1);
    assert!(matches!(
        summary.failed[0].error,
        PublishError::Configuration(_)
    ));
}
