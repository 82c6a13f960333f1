use std::collections::HashMap;
use std::time::Duration;

use otelemetry::re_exports::opentelemetry::trace::Status;
use otelemetry::{
    add_baggage_item, attribute, get_baggage_item, log_attribute, Config, Context, Telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pass a collector host to export over OTLP; without one everything prints to stdout.
    let host = std::env::args().nth(1);
    let remote = host.is_some();

    let mut builder = Config::from_env()
        .service_name("otelemetry-demo")
        .service_namespace("demo")
        .service_version("1.0.0")
        .with_traces(remote)
        .with_metrics(remote)
        .with_logs(remote);
    if let Some(host) = host {
        builder = builder.collector(host, "4317");
    }

    let telemetry = Telemetry::new(builder.build())?;
    telemetry.install_globals();
    telemetry.install_subscriber()?;

    tracing::info!("Demo application started");

    let cx = add_baggage_item(&Context::new(), "tenant", "acme");
    process_order(&telemetry, &cx, "order-123", 3).await;

    tracing::info!("Demo application finished");

    telemetry.shutdown(Duration::from_secs(1))?;
    Ok(())
}

async fn process_order(telemetry: &Telemetry, cx: &Context, order_id: &str, item_count: u32) {
    let (cx, span) = telemetry.start_span(cx, "process-order");
    span.set_attributes([attribute("order.id", order_id.to_string())]);

    let processed = telemetry.metric().map(|m| m.u64_counter("items.processed").build());

    for item in 1..=item_count {
        simulate_work(Duration::from_millis(30)).await;
        if let Some(counter) = &processed {
            counter.add(1, &[attribute("order.id", order_id.to_string())]);
        }
        if item == 2 {
            span.add_event("retry", vec![attribute("item", item)]);
        }
    }

    // What a downstream service would receive.
    let mut carrier = HashMap::new();
    telemetry.inject(&cx, &mut carrier);
    let downstream = telemetry.extract(&Context::new(), &carrier);

    if let Some(log) = telemetry.log() {
        log.info(
            &cx,
            "Order processed",
            vec![
                log_attribute("items", item_count),
                log_attribute(
                    "tenant",
                    get_baggage_item(&downstream, "tenant").unwrap_or_default(),
                ),
            ],
        );
    }

    span.set_status(Status::Ok);
    span.end();
}

async fn simulate_work(duration: Duration) {
    tokio::time::sleep(duration).await;
}
