//! Publishing: backend configurations, the sink contract, the router that fans a report out
//! to every configured publisher, and the hybrid composite.

pub mod configuration;
pub mod hybrid;
pub mod pipeline;
pub mod router;
pub mod sink;
pub mod sinks;

pub use configuration::{
    BackendConfiguration, DocumentStorePublisherConfiguration, HybridPublisherConfiguration,
    InfluxDbPublisherConfiguration, Order, OutputPublisherConfiguration, PublishScope,
    PublisherConfiguration, PublisherKind, PushGatewayPublisherConfiguration,
    HYBRID_SUPPORTED_KINDS,
};
pub use hybrid::{HybridIssue, HybridPlan, HybridPublisher, HybridSide, BOTH_PUBLISHERS_ABSENT};
pub use pipeline::{PipelineOutcome, PublishPipeline};
pub use router::{PublishSummary, PublisherRouter, SinkFailure};
pub use sink::{BackendSinkFactory, Sink, SinkFactory};
