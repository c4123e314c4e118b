use geotable::prelude::*;
use geotable::{AttributeSet, GeoRow, HashKeyRange};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Wraps the memory backend and misbehaves on range scans and writes.
#[derive(Default)]
struct FlakyBackend {
    inner: MemoryBackend,
    fail_scan: Option<usize>,
    scan_delay: Option<Duration>,
    scans: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    write_delay: Option<Duration>,
    writes_in_flight: AtomicUsize,
    max_writes_in_flight: AtomicUsize,
}

impl GeoBackend for FlakyBackend {
    async fn create_table(&self, table: &str) -> Result<()> {
        self.inner.create_table(table).await
    }

    async fn put_row(&self, table: &str, row: GeoRow) -> Result<()> {
        let running = self.writes_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_writes_in_flight.fetch_max(running, Ordering::SeqCst);

        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }
        self.writes_in_flight.fetch_sub(1, Ordering::SeqCst);
        self.inner.put_row(table, row).await
    }

    async fn get_row(&self, table: &str, identifier: &str) -> Result<Option<GeoRow>> {
        self.inner.get_row(table, identifier).await
    }

    async fn delete_row(&self, table: &str, identifier: &str) -> Result<Option<GeoRow>> {
        self.inner.delete_row(table, identifier).await
    }

    async fn query_range(
        &self,
        table: &str,
        range: &HashKeyRange,
        projection: Option<&AttributeSet>,
    ) -> Result<Vec<GeoRow>> {
        let scan = self.scans.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        if let Some(delay) = self.scan_delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_scan == Some(scan) {
            return Err(GeoError::BackendUnavailable(
                "provisioned throughput exceeded".to_string(),
            ));
        }
        self.inner.query_range(table, range, projection).await
    }

    async fn scan_eq(&self, table: &str, attribute: &str, value: &str) -> Result<Vec<GeoRow>> {
        self.inner.scan_eq(table, attribute, value).await
    }
}

async fn flaky_table(backend: FlakyBackend, config: Config) -> GeoTable<FlakyBackend> {
    let _ = env_logger::builder().is_test(true).try_init();
    let table = GeoTable::builder(Arc::new(backend))
        .config(config)
        .build()
        .unwrap();
    table.create_table().await.unwrap();
    table
        .put_points(vec![
            Record::new("a", GeoPoint::new(10.0, 10.0)),
            Record::new("b", GeoPoint::new(-10.0, -10.0)),
            Record::new("c", GeoPoint::new(45.0, 170.0)),
        ])
        .await
        .unwrap();
    table
}

fn whole_world() -> QueryRectangleRequest {
    QueryRectangleRequest::new(GeoPoint::new(-90.0, -180.0), GeoPoint::new(90.0, 180.0))
}

#[tokio::test]
async fn test_world_query_scans_every_partition() {
    let table = flaky_table(
        FlakyBackend::default(),
        Config::default().with_partition_bits(4),
    )
    .await;

    assert_eq!(table.covering_ranges(&BoundingBox::world()).len(), 16);
    let found = table.query_rectangle(&whole_world()).await.unwrap();
    assert_eq!(found.len(), 3);
    assert_eq!(table.backend().scans.load(Ordering::SeqCst), 16);
}

#[tokio::test]
async fn test_one_failed_scan_fails_the_query() {
    let backend = FlakyBackend {
        fail_scan: Some(0),
        ..Default::default()
    };
    let table = flaky_table(backend, Config::default().with_partition_bits(4)).await;

    let err = table.query_rectangle(&whole_world()).await.unwrap_err();
    assert!(err.is_backend_unavailable());
    let message = err.to_string();
    assert!(message.contains("provisioned throughput exceeded"), "{message}");
    assert!(message.contains("partition"), "{message}");
}

#[tokio::test]
async fn test_query_timeout_is_backend_unavailable() {
    let backend = FlakyBackend {
        scan_delay: Some(Duration::from_millis(500)),
        ..Default::default()
    };
    let config = Config::default().with_query_timeout(Duration::from_millis(20));
    let table = flaky_table(backend, config).await;

    let err = table
        .query_radius(&QueryRadiusRequest::new(GeoPoint::new(10.0, 10.0), 1_000.0))
        .await
        .unwrap_err();
    assert!(err.is_backend_unavailable(), "{err}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_scan_concurrency_is_bounded() {
    let backend = FlakyBackend {
        scan_delay: Some(Duration::from_millis(10)),
        ..Default::default()
    };
    let config = Config::default()
        .with_partition_bits(4)
        .with_max_concurrent_scans(3);
    let table = flaky_table(backend, config).await;

    let found = table.query_rectangle(&whole_world()).await.unwrap();
    assert_eq!(found.len(), 3);

    let peak = table.backend().max_in_flight.load(Ordering::SeqCst);
    assert!(peak >= 1 && peak <= 3, "peak in-flight scans: {peak}");
}

#[tokio::test]
async fn test_invalid_query_makes_no_backend_calls() {
    let table = flaky_table(FlakyBackend::default(), Config::default()).await;

    let err = table
        .query_radius(&QueryRadiusRequest::new(GeoPoint::new(0.0, 0.0), f64::NAN))
        .await
        .unwrap_err();
    assert!(err.is_invalid_input());
    assert_eq!(table.backend().scans.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_batch_write_concurrency_is_bounded() {
    let backend = FlakyBackend {
        write_delay: Some(Duration::from_millis(5)),
        ..Default::default()
    };
    let table = flaky_table(backend, Config::default().with_max_concurrent_scans(2)).await;

    let records: Vec<Record> = (0..20)
        .map(|i| Record::new(format!("w{}", i), GeoPoint::new(i as f64, i as f64)))
        .collect();
    table.put_points(records).await.unwrap();

    assert_eq!(table.backend().inner.row_count(table.table_name()), Some(23));
    let peak = table.backend().max_writes_in_flight.load(Ordering::SeqCst);
    assert!(peak >= 1 && peak <= 2, "peak in-flight writes: {peak}");
}
