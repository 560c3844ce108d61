use opentelemetry::trace::{Tracer, TracerProvider as _};
use opentelemetry::KeyValue;
use opentelemetry_resource_container::ContainerResourceDetector;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

fn init_diagnostics() {
    // The detector reports which source produced the container id at info
    // level and each extractor hit at debug level. Set RUST_LOG=debug to see both.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(filter))
        .init();
}

fn main() {
    init_diagnostics();

    let detector = ContainerResourceDetector::new();
    match detector.identity() {
        Some(identity) => println!(
            "container.id = {} (from {})",
            identity.container_id(),
            identity.source()
        ),
        None => println!("not running in a recognizable container"),
    }

    let resource = Resource::builder_empty()
        .with_detector(Box::new(detector))
        .with_attribute(KeyValue::new("service.name", "container-resource-demo"))
        .build();

    for (key, value) in resource.iter() {
        println!("{key} = {value}");
    }

    let provider = SdkTracerProvider::builder()
        .with_resource(resource)
        .build();
    provider.tracer("container-resource").in_span("startup", |_cx| {
        tracing::info!(name: "startup", "resource attached to tracer provider");
    });

    if let Err(err) = provider.shutdown() {
        eprintln!("failed to shut down tracer provider: {err}");
    }
}
