use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use heyhi_gateway_lib::telemetry::metrics::init_metrics;
use heyhi_gateway_lib::telemetry::server::serve_observability;

mod common;
use common::TestResult;

#[tokio::test]
async fn serves_live_and_metrics() -> TestResult {
    let (metrics, registry) = init_metrics()?;
    metrics.record_request("POST", "chat", 200, 0.012);
    metrics.record_rate_limit_rejected("chat");

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (stop, stopped) = oneshot::channel::<()>();
    let task = tokio::spawn(serve_observability(listener, registry, async {
        let _ = stopped.await;
    }));

    let live = reqwest::get(format!("http://{addr}/live")).await?;
    assert_eq!(live.status(), 200);
    assert_eq!(live.json::<Value>().await?["status"], "alive");

    let scrape = reqwest::get(format!("http://{addr}/metrics")).await?;
    assert_eq!(scrape.status(), 200);
    let text = scrape.text().await?;
    assert!(text.contains("heyhi_build_info"), "missing build info in:\n{text}");
    assert!(text.contains("heyhi_requests_total"), "missing request counter in:\n{text}");

    let missing = reqwest::get(format!("http://{addr}/nope")).await?;
    assert_eq!(missing.status(), 404);

    let _ = stop.send(());
    task.await??;
    Ok(())
}
