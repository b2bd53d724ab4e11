//! End-to-end runner tests with built-in and registered adapters

use async_trait::async_trait;
use harbor::adapters::{AdapterFields, AdapterRegistry, Sink, Source};
use harbor::cli::commands::run::split_invocation_args;
use harbor::config::Config;
use harbor::core::runner::{FailurePolicy, Runner, RunnerOptions};
use harbor::core::template::FormatMode;
use harbor::domain::{AdapterKind, HarborError, ReportData, Result, Table};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const NOW: &str = "2016-02-12 18:19:09";

/// Source returning a fixed table and counting `process` calls
struct CountingSource {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Source for CountingSource {
    async fn process(&mut self) -> Result<ReportData> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let table = Table::from_rows(
            vec!["region".to_string(), "amount".to_string()],
            vec![
                vec![json!("A"), json!(10)],
                vec![json!("A"), json!(5)],
                vec![json!("B"), json!(7)],
            ],
        )?;
        Ok(table.into())
    }
}

struct FailingSource;

#[async_trait]
impl Source for FailingSource {
    async fn process(&mut self) -> Result<ReportData> {
        Err(HarborError::Adapter("upstream unavailable".to_string()))
    }
}

type Deliveries = Arc<Mutex<Vec<(String, AdapterFields)>>>;

/// Sink recording the `tag` field of every save; `fail: true` makes it fail
struct TagSink {
    tag: String,
    fields: AdapterFields,
    deliveries: Deliveries,
}

#[async_trait]
impl Sink for TagSink {
    async fn save(&mut self) -> Result<()> {
        if self.fields.get("fail") == Some(&Value::Bool(true)) {
            return Err(HarborError::Adapter(format!("sink '{}' failed", self.tag)));
        }
        self.deliveries
            .lock()
            .unwrap()
            .push((self.tag.clone(), self.fields.clone()));
        Ok(())
    }
}

struct Harness {
    registry: AdapterRegistry,
    calls: Arc<AtomicUsize>,
    deliveries: Deliveries,
}

fn harness() -> Harness {
    let calls = Arc::new(AtomicUsize::new(0));
    let deliveries: Deliveries = Arc::default();
    let mut registry = AdapterRegistry::with_builtins();

    let counter = Arc::clone(&calls);
    registry.register_source("counting", move |_ctx, _fields| {
        Ok(Box::new(CountingSource {
            calls: Arc::clone(&counter),
        }) as Box<dyn Source>)
    });
    registry.register_source("failing", |_ctx, _fields| {
        Ok(Box::new(FailingSource) as Box<dyn Source>)
    });

    let sink_deliveries = Arc::clone(&deliveries);
    registry.register_sink("tag", move |_ctx, _data, fields| {
        let tag = fields
            .get("tag")
            .and_then(Value::as_str)
            .unwrap_or("untagged")
            .to_string();
        Ok(Box::new(TagSink {
            tag,
            fields: fields.clone(),
            deliveries: Arc::clone(&sink_deliveries),
        }) as Box<dyn Sink>)
    });

    Harness {
        registry,
        calls,
        deliveries,
    }
}

fn config(dir: &Path, reports: Value) -> Config {
    Config::build(json!({"now": NOW, "reports": reports}), Some(dir)).unwrap()
}

fn tags(deliveries: &Deliveries) -> Vec<String> {
    deliveries
        .lock()
        .unwrap()
        .iter()
        .map(|(tag, _)| tag.clone())
        .collect()
}

#[tokio::test]
async fn test_unknown_result_type_never_runs_source() {
    let dir = TempDir::new().unwrap();
    let h = harness();
    let config = config(
        dir.path(),
        json!([{
            "name": "r",
            "type": "counting",
            "results": [{"type": "tag", "tag": "first"}, {"type": "carrier_pigeon"}]
        }]),
    );
    let runner = Runner::new(config, h.registry, RunnerOptions::default()).unwrap();

    let err = runner.run_report("r").await.unwrap_err();
    assert!(matches!(
        err,
        HarborError::UnknownAdapterType { kind: AdapterKind::Sink, ref type_name }
            if type_name == "carrier_pigeon"
    ));
    assert_eq!(h.calls.load(Ordering::SeqCst), 0);
    assert!(tags(&h.deliveries).is_empty());
}

#[tokio::test]
async fn test_unknown_report_type() {
    let dir = TempDir::new().unwrap();
    let h = harness();
    let config = config(dir.path(), json!([{"name": "r", "type": "telepathy"}]));
    let runner = Runner::new(config, h.registry, RunnerOptions::default()).unwrap();

    let err = runner.run_report("r").await.unwrap_err();
    assert_eq!(err.to_string(), "Unknown report type 'telepathy'");
}

#[tokio::test]
async fn test_unknown_report_name() {
    let dir = TempDir::new().unwrap();
    let h = harness();
    let runner = Runner::new(config(dir.path(), json!([])), h.registry, RunnerOptions::default())
        .unwrap();

    assert!(matches!(
        runner.run_report("ghost").await.unwrap_err(),
        HarborError::ReportNotFound(_)
    ));
}

#[tokio::test]
async fn test_results_run_in_declared_order() {
    let dir = TempDir::new().unwrap();
    let h = harness();
    let config = config(
        dir.path(),
        json!([{
            "name": "r",
            "type": "counting",
            "results": [
                {"type": "tag", "tag": "one"},
                {"type": "tag", "tag": "two"},
                {"type": "tag", "tag": "three"}
            ]
        }]),
    );
    let runner = Runner::new(config, h.registry, RunnerOptions::default()).unwrap();

    let summary = runner.run_report("r").await.unwrap();
    assert_eq!(summary.results_saved, 3);
    assert_eq!(summary.shape, Some((3, 2)));
    assert_eq!(tags(&h.deliveries), vec!["one", "two", "three"]);
    assert_eq!(h.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_source_failure_skips_results() {
    let dir = TempDir::new().unwrap();
    let h = harness();
    let config = config(
        dir.path(),
        json!([{"name": "r", "type": "failing", "results": [{"type": "tag", "tag": "one"}]}]),
    );
    let runner = Runner::new(config, h.registry, RunnerOptions::default()).unwrap();

    let err = runner.run_report("r").await.unwrap_err();
    match err {
        HarborError::ReportExecution { report, message } => {
            assert_eq!(report, "r");
            assert!(message.contains("upstream unavailable"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(tags(&h.deliveries).is_empty());
}

fn failing_middle() -> Value {
    json!([{
        "name": "r",
        "type": "counting",
        "results": [
            {"type": "tag", "tag": "one"},
            {"type": "tag", "tag": "two", "fail": true},
            {"type": "tag", "tag": "three"}
        ]
    }])
}

#[tokio::test]
async fn test_abort_policy_stops_at_first_failure() {
    let dir = TempDir::new().unwrap();
    let h = harness();
    let runner = Runner::new(
        config(dir.path(), failing_middle()),
        h.registry,
        RunnerOptions::default(),
    )
    .unwrap();

    let err = runner.run_report("r").await.unwrap_err();
    match err {
        HarborError::ResultExecution { report, failures } => {
            assert_eq!(report, "r");
            assert_eq!(failures.len(), 1);
            assert_eq!(failures.iter().next().unwrap().index, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(tags(&h.deliveries), vec!["one"]);
}

#[tokio::test]
async fn test_continue_policy_attempts_every_result() {
    let dir = TempDir::new().unwrap();
    let h = harness();
    let runner = Runner::new(
        config(dir.path(), failing_middle()),
        h.registry,
        RunnerOptions::default().with_failure_policy(FailurePolicy::Continue),
    )
    .unwrap();

    let err = runner.run_report("r").await.unwrap_err();
    assert!(matches!(err, HarborError::ResultExecution { ref failures, .. } if failures.len() == 1));
    assert_eq!(tags(&h.deliveries), vec!["one", "three"]);
}

#[tokio::test]
async fn test_extra_args_override_result_fields() {
    let dir = TempDir::new().unwrap();
    let h = harness();
    let config = config(
        dir.path(),
        json!([{
            "name": "r",
            "type": "counting",
            "results": [{"type": "tag", "tag": "declared", "fail": true}]
        }]),
    );
    let extra = json!({"tag": "from_cli", "fail": false});
    let runner = Runner::new(
        config,
        h.registry,
        RunnerOptions::default().with_extra_args(extra.as_object().unwrap().clone()),
    )
    .unwrap();

    runner.run_report("r").await.unwrap();
    let deliveries = h.deliveries.lock().unwrap();
    assert_eq!(deliveries[0].0, "from_cli");
    assert_eq!(deliveries[0].1["fail"], json!(false));
}

#[tokio::test]
async fn test_extra_now_overrides_reference_time() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("in.csv"), "a\n1\n").unwrap();
    let config = config(
        dir.path(),
        json!([{
            "name": "r",
            "type": "file",
            "filename": "in.csv",
            "results": [{"type": "file", "filename": "out_{y}{m}{d}.csv"}]
        }]),
    );
    let extra = json!({"now": "2020-07-01 00:00:00"});
    let runner = Runner::new(
        config,
        AdapterRegistry::with_builtins(),
        RunnerOptions::default().with_extra_args(extra.as_object().unwrap().clone()),
    )
    .unwrap();

    runner.run_report("r").await.unwrap();
    assert!(dir.path().join("out_20200701.csv").exists());
}

#[tokio::test]
async fn test_template_argument_from_command_line_names_output_file() {
    let dir = TempDir::new().unwrap();
    let h = harness();
    let config = config(
        dir.path(),
        json!([{
            "name": "daily",
            "type": "counting",
            "results": [{"type": "file", "filename": "out.csv"}]
        }]),
    );
    let args: Vec<String> = ["daily", "--filename", "{y}{m}{d-1d}.csv", "--start", "{t-1d}"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let (report, extra) = split_invocation_args(&args).unwrap();
    assert_eq!(extra["start"], json!("{t-1d}"));

    let start = extra["start"].as_str().unwrap().to_string();

    let runner = Runner::new(
        config,
        h.registry,
        RunnerOptions::default().with_extra_args(extra),
    )
    .unwrap();

    let rendered = runner
        .config()
        .formatter(FormatMode::Iso, None)
        .unwrap()
        .format(&start)
        .unwrap();
    assert_eq!(rendered, "2016-02-11 00:00:00");

    runner.run_report(report.as_deref().unwrap()).await.unwrap();
    let csv = fs::read_to_string(dir.path().join("20160211.csv")).unwrap();
    assert_eq!(csv, "region,amount\nA,10\nA,5\nB,7\n");
    assert!(!dir.path().join("out.csv").exists());
}

#[tokio::test]
async fn test_file_to_file_round_trip() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("sales.csv"), "region,amount\nA,10\nB,7\n").unwrap();
    let config = config(
        dir.path(),
        json!([{
            "name": "sales",
            "type": "file",
            "filename": "sales.csv",
            "results": [
                {"type": "file", "filename": "out/sales_{y}{m-1d}.json"},
                {"type": "file", "filename": "out/sales.tsv"}
            ]
        }]),
    );
    let runner = Runner::new(config, AdapterRegistry::with_builtins(), RunnerOptions::default())
        .unwrap();

    let summary = runner.run_report("sales").await.unwrap();
    assert_eq!(summary.results_saved, 2);

    let json_out: Value =
        serde_json::from_slice(&fs::read(dir.path().join("out/sales_201602.json")).unwrap())
            .unwrap();
    assert_eq!(
        json_out,
        json!([{"region": "A", "amount": 10}, {"region": "B", "amount": 7}])
    );

    let tsv = fs::read_to_string(dir.path().join("out/sales.tsv")).unwrap();
    assert_eq!(tsv, "region\tamount\nA\t10\nB\t7\n");
}

#[cfg(unix)]
#[tokio::test]
async fn test_bash_report_with_templated_script() {
    let dir = TempDir::new().unwrap();
    let config = config(
        dir.path(),
        json!([{
            "name": "from_bash",
            "type": "bash",
            "script": "echo '[{\"day\": \"{t-1d}\"}]'",
            "results": [{"type": "file", "filename": "day.csv"}]
        }]),
    );
    let runner = Runner::new(config, AdapterRegistry::with_builtins(), RunnerOptions::default())
        .unwrap();

    runner.run_report("from_bash").await.unwrap();
    let csv = fs::read_to_string(dir.path().join("day.csv")).unwrap();
    assert_eq!(csv, "day\n2016-02-11 00:00:00\n");
}

#[tokio::test]
async fn test_run_all_collects_failures() {
    let dir = TempDir::new().unwrap();
    let h = harness();
    let config = config(
        dir.path(),
        json!([
            {"name": "first", "type": "counting", "results": [{"type": "tag", "tag": "first"}]},
            {"name": "broken", "type": "failing"},
            {"name": "last", "type": "counting", "results": [{"type": "tag", "tag": "last"}]}
        ]),
    );
    let runner = Runner::new(config, h.registry, RunnerOptions::default()).unwrap();

    let summary = runner.run_all().await;
    assert_eq!(summary.total(), 3);
    assert!(!summary.is_successful());
    assert_eq!(summary.failed_reports(), vec!["broken"]);
    assert_eq!(tags(&h.deliveries), vec!["first", "last"]);
}
