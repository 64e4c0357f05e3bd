use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use coinscope::analysis::{CoinAnalyzer, MetricProvider, SentimentScorer};
use coinscope::api::CoinGeckoClient;
use coinscope::config::CoinGeckoConfig;
use coinscope::models::{AnalysisResult, CoinRecord, REPORT_COLUMNS};
use coinscope::store::CoinStore;
use coinscope::Pipeline;
use serde_json::{json, Value};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path as FsPath, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const HASH_RATE: u64 = 120_000_000;
const TEMPLATE: &str = "{symbol} market news today is good!";

async fn coin_detail(Path(id): Path<String>) -> Json<Value> {
    let followers = if id == "btc" { 5_000_000 } else { 1_234 };
    Json(json!({ "id": id, "community_data": { "twitter_followers": followers } }))
}

async fn markets(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
    let id = q.get("ids").cloned().unwrap_or_default();
    if q.get("vs_currency").map(String::as_str) != Some("usd") {
        return Json(json!([]));
    }
    Json(json!([{ "id": id, "total_volume": 987_654.9 }]))
}

async fn tvl() -> Json<Value> {
    Json(json!([
        { "name": "entry without id" },
        { "id": "BTC", "tvl": 42.123_456 },
        { "id": "eth", "tvl": 7.25 }
    ]))
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn mock_coingecko() -> String {
    serve(
        Router::new()
            .route("/coins/markets", get(markets))
            .route("/coins/{id}", get(coin_detail))
            .route("/defi/tvl", get(tvl)),
    )
    .await
}

#[derive(Default)]
struct InFlight {
    now: AtomicUsize,
    peak: AtomicUsize,
}

async fn staggered_detail(State(tracker): State<Arc<InFlight>>, Path(id): Path<String>) -> Json<Value> {
    let now = tracker.now.fetch_add(1, Ordering::SeqCst) + 1;
    tracker.peak.fetch_max(now, Ordering::SeqCst);
    let delay = if id == "c0" { 600 } else { 50 };
    tokio::time::sleep(Duration::from_millis(delay)).await;
    tracker.now.fetch_sub(1, Ordering::SeqCst);
    Json(json!({ "id": id, "community_data": { "twitter_followers": 1 } }))
}

/// `/coins/c0` answers last; every other coin answers quickly.
async fn staggered_coingecko() -> (String, Arc<InFlight>) {
    let tracker = Arc::new(InFlight::default());
    let app = Router::new()
        .route("/coins/markets", get(markets))
        .route("/coins/{id}", get(staggered_detail))
        .route("/defi/tvl", get(tvl))
        .with_state(tracker.clone());
    (serve(app).await, tracker)
}

fn record(symbol: &str, time: i64, close: f64, volume: f64) -> CoinRecord {
    CoinRecord {
        symbol: symbol.to_string(),
        time,
        open: close,
        high: close,
        low: close,
        close,
        volume,
    }
}

async fn seeded_store(dir: &FsPath, records: &[CoinRecord]) -> CoinStore {
    let store = CoinStore::new(dir.join("users.db"));
    store.ensure_schema().await.unwrap();
    store.insert_records(records).await.unwrap();
    store
}

fn pipeline(store: &CoinStore, base_url: &str, timeout_ms: u64, workers: usize, output: PathBuf) -> Pipeline {
    let client = CoinGeckoClient::new(CoinGeckoConfig {
        base_url: base_url.to_string(),
        timeout_ms,
        requests_per_minute: None,
    })
    .unwrap();
    let provider = MetricProvider::new(store.clone(), client, 1000.0);
    let analyzer = CoinAnalyzer::new(provider, SentimentScorer::vader(TEMPLATE), HASH_RATE);
    Pipeline::new(store.clone(), analyzer, workers, output)
}

fn read_report(path: &FsPath) -> (Vec<String>, Vec<AnalysisResult>) {
    let mut rdr = csv::Reader::from_path(path).unwrap();
    let headers = rdr.headers().unwrap().iter().map(String::from).collect();
    let rows = rdr.deserialize().map(|r| r.unwrap()).collect();
    (headers, rows)
}

#[tokio::test]
async fn single_btc_row_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(dir.path(), &[record("BTC", 1_700_000_000, 50_000.0, 10.0)]).await;
    let base = mock_coingecko().await;
    let output = dir.path().join("out").join("analysis.csv");

    let summary = pipeline(&store, &base, 2_000, 20, output.clone())
        .run()
        .await
        .unwrap();
    assert_eq!(summary.symbols, 1);
    assert_eq!(summary.written, 1);

    let (headers, rows) = read_report(&output);
    assert_eq!(headers, REPORT_COLUMNS);
    assert_eq!(rows.len(), 1);

    let btc = &rows[0];
    assert_eq!(btc.symbol, "BTC");
    assert_eq!(btc.price, 50_000.0);
    assert_eq!(btc.volume, 10.0);
    assert_eq!(btc.market_cap, 500_000.0);
    assert_eq!(btc.nvt, 50_000.0);
    assert_eq!(btc.mvrv, 50_000.0);
    assert_eq!(btc.whale_movements, 0);
    assert_eq!(btc.exchange_flow, 10.0);
    assert_eq!(btc.hash_rate, HASH_RATE);
    assert_eq!(btc.active_addresses, 5_000_000);
    assert_eq!(btc.tx_count, 987_654);
    assert_eq!(btc.tvl, 42.1235);
    assert!(btc.sentiment > 0.0 && btc.sentiment <= 1.0);
}

#[tokio::test]
async fn eth_whales_and_exchange_flow() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(
        dir.path(),
        &[record("ETH", 1, 3_000.0, 2_000.0), record("ETH", 2, 3_100.0, 500.0)],
    )
    .await;
    let base = mock_coingecko().await;

    let rows = pipeline(&store, &base, 2_000, 4, dir.path().join("r.csv"))
        .collect()
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);

    let eth = &rows[0];
    assert_eq!(eth.whale_movements, 1);
    assert_eq!(eth.exchange_flow, 2_500.0);
    assert_eq!(eth.price, 3_100.0);
    assert_eq!(eth.volume, 500.0);
    assert_eq!(eth.active_addresses, 1_234);
    assert_eq!(eth.tvl, 7.25);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn every_symbol_reported_once_for_any_worker_count() {
    let dir = tempfile::tempdir().unwrap();
    let symbols: Vec<String> = (0..8).map(|i| format!("C{i}")).collect();
    let records: Vec<CoinRecord> = symbols
        .iter()
        .enumerate()
        .map(|(i, s)| record(s, i as i64, 1.0 + i as f64, 100.0))
        .collect();
    let store = seeded_store(dir.path(), &records).await;
    let base = mock_coingecko().await;
    let expected: BTreeSet<String> = symbols.iter().cloned().collect();

    for workers in 1..=symbols.len() {
        let output = dir.path().join(format!("report-{workers}.csv"));
        let summary = pipeline(&store, &base, 2_000, workers, output.clone())
            .run()
            .await
            .unwrap();
        assert_eq!(summary.written, symbols.len(), "workers={workers}");

        let (_, rows) = read_report(&output);
        assert_eq!(rows.len(), symbols.len(), "workers={workers}");
        let seen: BTreeSet<String> = rows.into_iter().map(|r| r.symbol).collect();
        assert_eq!(seen, expected, "workers={workers}");
    }
}

#[tokio::test]
async fn unreachable_api_degrades_to_zero() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(dir.path(), &[record("BTC", 1, 50_000.0, 10.0)]).await;

    let rows = pipeline(&store, "http://127.0.0.1:1", 500, 2, dir.path().join("r.csv"))
        .collect()
        .await
        .unwrap();

    let btc = &rows[0];
    assert_eq!((btc.active_addresses, btc.tx_count, btc.tvl), (0, 0, 0.0));
    assert_eq!(btc.market_cap, 500_000.0);
    assert_eq!(btc.hash_rate, HASH_RATE);
}

#[tokio::test]
async fn slow_api_times_out_to_zero() {
    let base = serve(Router::new().fallback(|| async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        "[]"
    }))
    .await;

    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(dir.path(), &[record("ETH", 1, 10.0, 1.0)]).await;

    let start = Instant::now();
    let rows = pipeline(&store, &base, 200, 1, dir.path().join("r.csv"))
        .collect()
        .await
        .unwrap();

    assert!(start.elapsed() < Duration::from_secs(4));
    assert_eq!(rows[0].active_addresses, 0);
    assert_eq!(rows[0].tx_count, 0);
    assert_eq!(rows[0].tvl, 0.0);
}

#[tokio::test]
async fn error_status_and_garbage_payloads_degrade_to_zero() {
    let failing = serve(Router::new().fallback(|| async {
        (StatusCode::INTERNAL_SERVER_ERROR, "boom")
    }))
    .await;
    let garbage = serve(Router::new().fallback(|| async { "definitely not json" })).await;

    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(dir.path(), &[record("SOL", 1, 20.0, 5.0)]).await;

    for base in [failing, garbage] {
        let rows = pipeline(&store, &base, 2_000, 1, dir.path().join("r.csv"))
            .collect()
            .await
            .unwrap();
        let sol = &rows[0];
        assert_eq!((sol.active_addresses, sol.tx_count, sol.tvl), (0, 0, 0.0), "{base}");
        assert_eq!(sol.market_cap, 100.0);
    }
}

#[tokio::test]
async fn empty_store_writes_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(dir.path(), &[]).await;
    let output = dir.path().join("empty.csv");

    let summary = pipeline(&store, "http://127.0.0.1:1", 500, 20, output.clone())
        .run()
        .await
        .unwrap();
    assert_eq!(summary.symbols, 0);

    let (headers, rows) = read_report(&output);
    assert_eq!(headers, REPORT_COLUMNS);
    assert!(rows.is_empty());
}

#[tokio::test]
async fn missing_database_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let store = CoinStore::new(dir.path().join("absent.db"));
    let output = dir.path().join("never.csv");

    let result = pipeline(&store, "http://127.0.0.1:1", 500, 2, output.clone())
        .run()
        .await;
    assert!(result.is_err());
    assert!(!output.exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn rows_arrive_in_completion_order_with_bounded_workers() {
    let dir = tempfile::tempdir().unwrap();
    let symbols: Vec<String> = (0..6).map(|i| format!("C{i}")).collect();
    let records: Vec<CoinRecord> = symbols.iter().map(|s| record(s, 1, 2.0, 3.0)).collect();
    let store = seeded_store(dir.path(), &records).await;

    let (base, tracker) = staggered_coingecko().await;
    let rows = pipeline(&store, &base, 5_000, 3, dir.path().join("r.csv"))
        .collect()
        .await
        .unwrap();
    let order: Vec<String> = rows.into_iter().map(|r| r.symbol).collect();

    assert_eq!(order.len(), symbols.len());
    assert_ne!(order, symbols);
    assert_ne!(order[0], "C0");
    assert_eq!(order.last().map(String::as_str), Some("C0"));
    let peak = tracker.peak.load(Ordering::SeqCst);
    assert!((2..=3).contains(&peak), "peak in flight: {peak}");

    let (base, tracker) = staggered_coingecko().await;
    let rows = pipeline(&store, &base, 5_000, 1, dir.path().join("r.csv"))
        .collect()
        .await
        .unwrap();
    let order: Vec<String> = rows.into_iter().map(|r| r.symbol).collect();

    assert_eq!(order, symbols);
    assert_eq!(tracker.peak.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn zero_workers_runs_with_one() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(dir.path(), &[record("BTC", 1, 1.0, 1.0), record("ETH", 1, 1.0, 1.0)]).await;

    let pipeline = pipeline(&store, "http://127.0.0.1:1", 500, 0, dir.path().join("r.csv"));
    assert_eq!(pipeline.workers(), 1);

    let summary = pipeline.run().await.unwrap();
    assert_eq!(summary.written, 2);
}
