//! Hybrid composite behaviour: validation logging, side scoping, and the wire result of a
//! time-series build side paired with a push-gateway task side.

use std::sync::Arc;

use buildpulse::publisher::{
    BackendConfiguration, HybridPublisherConfiguration, InfluxDbPublisherConfiguration,
    OutputPublisherConfiguration, PublishScope, PublisherConfiguration, PublisherKind,
    PublisherRouter, PushGatewayPublisherConfiguration, BOTH_PUBLISHERS_ABSENT,
};
use buildpulse::report::ExecutionReport;
use mockito::Matcher;

use super::test_utils::{capture_logs, failed_clean_report, RecordingFactory};

const UNSUPPORTED: &str = "Not supported Publisher. Current Publishers supported by \
                           HybridPublisher: InfluxDbPublisher, DocumentStorePublisher, PushGatewayPublisher";

fn hybrid(
    build: Option<BackendConfiguration>,
    task: Option<BackendConfiguration>,
) -> Vec<PublisherConfiguration> {
    vec![PublisherConfiguration::Hybrid(HybridPublisherConfiguration {
        build_publisher: build,
        task_publisher: task,
    })]
}

fn pushgateway(url: &str) -> BackendConfiguration {
    BackendConfiguration::PushGateway(PushGatewayPublisherConfiguration::new(url, "tracking"))
}

#[tokio::test]
async fn both_sides_absent_logs_and_dispatches_nothing() {
    let (logs, _guard) = capture_logs();
    let factory = RecordingFactory::default();
    let router = PublisherRouter::new(Arc::new(factory.clone()));

    router
        .publish(&ExecutionReport::default(), &hybrid(None, None))
        .await;

    assert!(factory.recorded().is_empty());
    assert_eq!(logs.count(BOTH_PUBLISHERS_ABSENT), 1);
    assert_eq!(logs.count("Not supported Publisher"), 0);
}

#[tokio::test]
async fn unsupported_build_side_still_dispatches_task_side() {
    let (logs, _guard) = capture_logs();
    let factory = RecordingFactory::default();
    let router = PublisherRouter::new(Arc::new(factory.clone()));
    let publishers = hybrid(
        Some(BackendConfiguration::Output(
            OutputPublisherConfiguration::default(),
        )),
        Some(pushgateway("http://localhost:9091")),
    );

    router.publish(&failed_clean_report(), &publishers).await;

    assert_eq!(logs.count(UNSUPPORTED), 1);
    let recorded = factory.recorded();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].publisher, PublisherKind::PushGateway);
    assert_eq!(recorded[0].scope, PublishScope::TASKS_ONLY);
    assert_eq!(recorded[0].report, failed_clean_report());
}

#[tokio::test]
async fn failing_side_does_not_block_sibling() {
    let factory = RecordingFactory::failing(&[PublisherKind::InfluxDb]);
    let router = PublisherRouter::new(Arc::new(factory.clone()));
    let publishers = hybrid(
        Some(BackendConfiguration::InfluxDb(
            InfluxDbPublisherConfiguration::new("http://localhost:8086", "tracking"),
        )),
        Some(pushgateway("http://localhost:9091")),
    );

    let summary = router.publish(&failed_clean_report(), &publishers).await;

    assert_eq!(factory.recorded().len(), 2);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].publisher, PublisherKind::Hybrid);
}

#[tokio::test]
async fn time_series_build_side_and_push_gateway_task_side_on_the_wire() {
    let mut influx = mockito::Server::new_async().await;
    let mut gateway = mockito::Server::new_async().await;

    let build_write = influx
        .mock("POST", "/write")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("db".into(), "tracking".into()),
            Matcher::UrlEncoded("precision".into(), "ms".into()),
        ]))
        .match_body(Matcher::Exact(
            "build duration=10.0,configuration=1.0,success=false 0".to_string(),
        ))
        .with_status(204)
        .expect(1)
        .create_async()
        .await;
    let task_push = gateway
        .mock("PUT", "/metrics/job/tracking")
        .match_body(Matcher::Regex(r#"task_duration_ms\{.*task="clean".*\} 1"#.to_string()))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    let build_push = gateway
        .mock("PUT", "/metrics/job/build")
        .expect(0)
        .create_async()
        .await;

    let publishers = hybrid(
        Some(BackendConfiguration::InfluxDb(
            InfluxDbPublisherConfiguration::new(influx.url(), "tracking"),
        )),
        Some(pushgateway(&gateway.url())),
    );
    let summary = PublisherRouter::default()
        .publish(&failed_clean_report(), &publishers)
        .await;

    assert!(summary.all_delivered(), "failures: {:?}", summary.failed);
    build_write.assert_async().await;
    task_push.assert_async().await;
    build_push.assert_async().await;
}
