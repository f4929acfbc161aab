//! End-to-end tests for intake, resolution and dispatch against an
//! in-memory store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use broadcaster::{AlertService, BroadcastConfig, EndpointSink, SinkError};
use mock_store::{DelayedStore, MemoryStore, UnavailableStore};
use outbreak_core::{
    AlertError, FailureReason, FeedEvent, GeoPoint, LocationInput, RecipientId, ReportId,
    ReportStore, Role,
};
use tokio::time::timeout;

/// Kolkata, where the reporter stands.
fn origin() -> GeoPoint {
    GeoPoint::new(88.36, 22.57).unwrap()
}

/// A point due north of `origin` at roughly `meters` away.
fn north_of_origin(meters: f64) -> GeoPoint {
    let degrees = meters / 6_371_008.8 * (180.0 / std::f64::consts::PI);
    GeoPoint::new(88.36, 22.57 + degrees).unwrap()
}

fn rid(id: &str) -> RecipientId {
    RecipientId::new(id).unwrap()
}

fn fast_config() -> BroadcastConfig {
    BroadcastConfig::default().with_delivery_timeout(Duration::from_millis(100))
}

async fn setup() -> (Arc<MemoryStore>, AlertService) {
    let store = Arc::new(MemoryStore::new());
    let service = AlertService::new(store.clone(), fast_config());
    (store, service)
}

struct SlowSink(Duration);

#[async_trait]
impl EndpointSink for SlowSink {
    async fn deliver(&self, _event: FeedEvent) -> Result<(), SinkError> {
        tokio::time::sleep(self.0).await;
        Ok(())
    }
}

struct FailingSink;

#[async_trait]
impl EndpointSink for FailingSink {
    async fn deliver(&self, _event: FeedEvent) -> Result<(), SinkError> {
        Err(SinkError::Rejected("connection reset".to_string()))
    }
}

/// Reports closed only when a delivery is attempted, as a session that
/// vanished after lookup would.
struct VanishedSink;

#[async_trait]
impl EndpointSink for VanishedSink {
    async fn deliver(&self, _event: FeedEvent) -> Result<(), SinkError> {
        Err(SinkError::Closed)
    }
}

#[derive(Default)]
struct CountingSink(AtomicUsize);

#[async_trait]
impl EndpointSink for CountingSink {
    async fn deliver(&self, _event: FeedEvent) -> Result<(), SinkError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn test_end_to_end_report_feed_and_alert() {
    let (store, service) = setup().await;
    store.add_fielder("A", origin()).await;
    let operator = store.add_operator("O", None).await;
    let b = store.add_fielder("B", north_of_origin(5_000.0)).await;
    let c = store.add_fielder("C", north_of_origin(50_000.0)).await;

    let mut operator_feed = service.subscribe(operator, Role::Operator);
    let mut b_feed = service.subscribe(b.clone(), Role::Fielder);
    let mut c_feed = service.subscribe(c, Role::Fielder);

    let report = service
        .submit_report("A", LocationInput::Wkt("POINT(88.36 22.57)".to_string()), None)
        .await
        .unwrap();

    let event = timeout(Duration::from_secs(1), operator_feed.recv())
        .await
        .expect("operator feed should receive the report")
        .unwrap();
    match event {
        FeedEvent::NewReport { report: received } => assert_eq!(received, report),
        other => panic!("unexpected event: {other:?}"),
    }

    // Fielders never see the raw report feed.
    assert!(b_feed.try_recv().is_none());

    let result = service
        .broadcast_alert(report.id, 10_000.0, "Evacuate")
        .await
        .unwrap();
    // O has no stored location and C is out of range.
    assert_eq!(result.attempted, 1);
    assert_eq!(result.delivered, 1);
    assert!(result.failed.is_empty());
    assert_eq!(result.summary(), "Alert successfully sent to 1 recipients.");

    let event = timeout(Duration::from_secs(1), b_feed.recv())
        .await
        .expect("B should receive the alert")
        .unwrap();
    assert_eq!(
        event,
        FeedEvent::Alert {
            message: "Evacuate".to_string(),
            report_id: report.id,
        }
    );

    assert!(c_feed.try_recv().is_none());
}

#[tokio::test]
async fn test_resolve_boundary_distances() {
    let (store, service) = setup().await;
    let radius = 2_000.0;
    let reporter = store.add_fielder("reporter", origin()).await;
    let at_zero = store.add_fielder("zero", origin()).await;
    let at_half = store.add_fielder("half", north_of_origin(radius / 2.0)).await;
    let at_edge = store.add_fielder("edge", north_of_origin(radius)).await;
    store.add_fielder("beyond", north_of_origin(radius + 1.0)).await;

    let report = store.insert_report(&reporter, origin(), "cough").await.unwrap();
    let found = service.resolve(report.id, radius).await.unwrap();

    assert_eq!(found.into_iter().collect::<Vec<_>>(), {
        let mut expected = vec![at_zero, at_half, at_edge];
        expected.sort();
        expected
    });
}

#[tokio::test]
async fn test_resolve_reflects_moves_between_calls() {
    let (store, service) = setup().await;
    let reporter = store.add_fielder("reporter", origin()).await;
    let b = store.add_fielder("b", north_of_origin(1_000.0)).await;
    let report = store.insert_report(&reporter, origin(), "cough").await.unwrap();

    let first = service.resolve(report.id, 5_000.0).await.unwrap();
    assert_eq!(first, service.resolve(report.id, 5_000.0).await.unwrap());
    assert!(first.contains(&b));

    store.set_location(&b, Some(north_of_origin(20_000.0))).await;
    assert!(service.resolve(report.id, 5_000.0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_dispatch_with_no_recipients_delivers_nothing() {
    let (store, service) = setup().await;
    let reporter = store.add_fielder("reporter", origin()).await;
    let counter = Arc::new(CountingSink::default());
    // Registered but far away.
    let far = store.add_fielder("far", north_of_origin(100_000.0)).await;
    service
        .registry()
        .register(far, Role::Fielder, counter.clone());
    // The reporter's own endpoint must never be used.
    service
        .registry()
        .register(reporter.clone(), Role::Fielder, counter.clone());

    let report = store.insert_report(&reporter, origin(), "cough").await.unwrap();
    let result = service.broadcast_alert(report.id, 1_000.0, "Evacuate").await.unwrap();

    assert_eq!(result.attempted, 0);
    assert_eq!(result.delivered, 0);
    assert!(result.failed.is_empty());
    assert_eq!(counter.0.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_dispatch_all_offline() {
    let (store, service) = setup().await;
    let reporter = store.add_fielder("reporter", origin()).await;
    let b = store.add_fielder("b", north_of_origin(100.0)).await;
    let c = store.add_fielder("c", north_of_origin(200.0)).await;
    let report = store.insert_report(&reporter, origin(), "cough").await.unwrap();

    let result = service.broadcast_alert(report.id, 1_000.0, "Evacuate").await.unwrap();
    assert_eq!(result.attempted, 2);
    assert_eq!(result.delivered, 0);
    assert_eq!(result.failed.get(&b), Some(&FailureReason::Offline));
    assert_eq!(result.failed.get(&c), Some(&FailureReason::Offline));
}

#[tokio::test]
async fn test_partial_endpoint_success_counts_as_delivered() {
    let (store, service) = setup().await;
    let reporter = store.add_fielder("reporter", origin()).await;
    let b = store.add_fielder("b", north_of_origin(100.0)).await;
    let c = store.add_fielder("c", north_of_origin(100.0)).await;
    let report = store.insert_report(&reporter, origin(), "cough").await.unwrap();

    let mut b_feed = service.subscribe(b.clone(), Role::Fielder);
    service
        .registry()
        .register(b.clone(), Role::Fielder, Arc::new(FailingSink));
    service
        .registry()
        .register(c.clone(), Role::Fielder, Arc::new(FailingSink));

    let result = service.broadcast_alert(report.id, 1_000.0, "Evacuate").await.unwrap();
    assert_eq!(result.attempted, 2);
    assert_eq!(result.delivered, 1);
    assert!(!result.failed.contains_key(&b));
    assert!(matches!(
        result.failed.get(&c),
        Some(FailureReason::DeliveryError(detail)) if detail.contains("connection reset")
    ));
    assert!(b_feed.try_recv().is_some());
}

#[tokio::test]
async fn test_slow_endpoint_is_bounded_by_timeout() {
    let (store, service) = setup().await;
    let reporter = store.add_fielder("reporter", origin()).await;
    let slow = store.add_fielder("slow", north_of_origin(100.0)).await;
    let quick = store.add_fielder("quick", north_of_origin(100.0)).await;
    let report = store.insert_report(&reporter, origin(), "cough").await.unwrap();

    service
        .registry()
        .register(slow.clone(), Role::Fielder, Arc::new(SlowSink(Duration::from_secs(30))));
    let mut quick_feed = service.subscribe(quick.clone(), Role::Fielder);

    let started = Instant::now();
    let result = service.broadcast_alert(report.id, 1_000.0, "Evacuate").await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(result.delivered, 1);
    assert!(matches!(
        result.failed.get(&slow),
        Some(FailureReason::DeliveryError(detail)) if detail.contains("timed out")
    ));
    assert!(quick_feed.try_recv().is_some());
}

#[tokio::test]
async fn test_closed_endpoint_is_unregistered() {
    let (store, service) = setup().await;
    let reporter = store.add_fielder("reporter", origin()).await;
    let b = store.add_fielder("b", north_of_origin(100.0)).await;
    let report = store.insert_report(&reporter, origin(), "cough").await.unwrap();

    service
        .registry()
        .register(b.clone(), Role::Fielder, Arc::new(VanishedSink));

    let result = service.broadcast_alert(report.id, 1_000.0, "Evacuate").await.unwrap();
    assert!(matches!(
        result.failed.get(&b),
        Some(FailureReason::DeliveryError(_))
    ));
    assert!(!service.registry().is_online(&b));

    // The next broadcast sees the recipient as offline.
    let result = service.broadcast_alert(report.id, 1_000.0, "Evacuate").await.unwrap();
    assert_eq!(result.failed.get(&b), Some(&FailureReason::Offline));
}

#[tokio::test]
async fn test_rebroadcast_is_not_deduplicated() {
    let (store, service) = setup().await;
    let reporter = store.add_fielder("reporter", origin()).await;
    let b = store.add_fielder("b", north_of_origin(100.0)).await;
    let report = store.insert_report(&reporter, origin(), "cough").await.unwrap();

    let counter = Arc::new(CountingSink::default());
    service.registry().register(b, Role::Fielder, counter.clone());

    for _ in 0..2 {
        service.broadcast_alert(report.id, 1_000.0, "Evacuate").await.unwrap();
    }
    assert_eq!(counter.0.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_broadcast_errors_propagate() {
    let (_, service) = setup().await;
    assert!(matches!(
        service.broadcast_alert(ReportId(404), 1_000.0, "Evacuate").await,
        Err(AlertError::NotFound { .. })
    ));
    assert!(matches!(
        service.broadcast_alert(ReportId(1), 0.0, "Evacuate").await,
        Err(AlertError::InvalidArgument(_))
    ));

    let down = AlertService::new(Arc::new(UnavailableStore::new()), fast_config());
    assert!(matches!(
        down.broadcast_alert(ReportId(1), 1_000.0, "Evacuate").await,
        Err(AlertError::StoreUnavailable(_))
    ));
    assert!(matches!(
        down.submit_report("a", LocationInput::from(origin()), None).await,
        Err(AlertError::StoreUnavailable(_))
    ));
}

#[tokio::test]
async fn test_intake_succeeds_when_operator_endpoint_fails() {
    let (store, service) = setup().await;
    let operator = store.add_operator("O", None).await;
    service
        .registry()
        .register(operator, Role::Operator, Arc::new(FailingSink));

    let report = service
        .submit_report("a", LocationInput::from(origin()), Some("lesions"))
        .await
        .unwrap();

    assert_eq!(report.symptom, "lesions");
    assert_eq!(store.report_count().await, 1);
}

#[tokio::test]
async fn test_intake_does_not_wait_for_operators() {
    let store = Arc::new(MemoryStore::new());
    let service = AlertService::new(
        store,
        BroadcastConfig::default().with_delivery_timeout(Duration::from_secs(30)),
    );
    service.registry().register(
        rid("O"),
        Role::Operator,
        Arc::new(SlowSink(Duration::from_secs(30))),
    );

    let started = Instant::now();
    service
        .submit_report("a", LocationInput::from(origin()), None)
        .await
        .unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_slow_store_does_not_block_registry() {
    let memory = MemoryStore::new();
    let reporter = memory.add_fielder("reporter", origin()).await;
    let report = memory.insert_report(&reporter, origin(), "cough").await.unwrap();
    let store: Arc<dyn ReportStore> = Arc::new(DelayedStore::with_millis(memory, 200));
    let service = AlertService::new(store, fast_config());

    let dispatch = {
        let service = service.clone();
        tokio::spawn(async move { service.broadcast_alert(report.id, 1_000.0, "Evacuate").await })
    };

    // Subscribing while resolution is in flight must not wait on the store.
    let started = Instant::now();
    let _sub = service.subscribe(rid("late"), Role::Fielder);
    assert!(started.elapsed() < Duration::from_millis(100));

    let result = dispatch.await.unwrap().unwrap();
    assert_eq!(result.attempted, 0);
}
