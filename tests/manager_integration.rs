//! Integration tests for the extraction manager
//!
//! The extractor is a recording stub and last run files live in a
//! temporary spool directory.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use eyre::Result;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use usage_extractor::dates::{epoch, parse_timestamp};
use usage_extractor::etl::{
    BoxedExtractor, Extractor, ExtractorRegistry, Loader, Manager, Records,
};
use usage_extractor::storage::{FileLastRunStore, LastRunStore};
use usage_extractor::{Config, ExtractError, FixedClock};

type Call = (String, NaiveDateTime, NaiveDateTime);

/// Extractor stub returning canned records and remembering its calls
#[derive(Clone, Default)]
struct StubExtractor {
    records: Records<Value>,
    failing: HashSet<String>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl StubExtractor {
    fn returning(records: Records<Value>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    fn failing_on(mut self, project: &str) -> Self {
        self.failing.insert(project.to_string());
        self
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Extractor for StubExtractor {
    type Record = Value;

    async fn extract_for_project(
        &self,
        project: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Records<Self::Record>> {
        self.calls
            .lock()
            .unwrap()
            .push((project.to_string(), from, to));
        if self.failing.contains(project) {
            eyre::bail!("backend unavailable for {}", project);
        }
        Ok(self.records.clone())
    }
}

/// Loader collecting everything it is handed
#[derive(Default)]
struct CollectingLoader {
    items: Mutex<Vec<Value>>,
}

impl Loader for CollectingLoader {
    type Item = Value;

    async fn load(&self, items: Vec<Self::Item>) -> Result<usize> {
        let count = items.len();
        self.items.lock().unwrap().extend(items);
        Ok(count)
    }
}

struct Fixture {
    spool: TempDir,
    stub: StubExtractor,
}

impl Fixture {
    fn new(stub: StubExtractor) -> Self {
        Self {
            spool: TempDir::new().unwrap(),
            stub,
        }
    }

    fn registry(&self) -> ExtractorRegistry<Value> {
        let stub = self.stub.clone();
        let mut registry = ExtractorRegistry::new();
        registry.register("stub", move || {
            let extractor: BoxedExtractor<Value> = Box::new(stub.clone());
            Ok(extractor)
        });
        registry
    }

    fn config(&self) -> Config {
        Config::default()
            .with_extractor("stub")
            .with_spooldir(self.spool.path())
    }

    fn manager(&self, config: Config) -> Manager<Value> {
        Manager::new(config, &self.registry())
            .unwrap()
            .with_clock(FixedClock(date("2020-01-01")))
    }

    fn store(&self) -> FileLastRunStore {
        FileLastRunStore::new(self.spool.path())
    }
}

fn date(value: &str) -> NaiveDateTime {
    parse_timestamp(value).unwrap()
}

fn single_record() -> Records<Value> {
    let id = "5c8bc02a0cb3474daf1a1a1e09bdb85a".to_string();
    Records::from([(id, Value::Null)])
}

fn assert_invalid_date(err: &eyre::Report) {
    let err = err
        .downcast_ref::<ExtractError>()
        .expect("error should be an ExtractError");
    assert!(err.is_invalid_date(), "unexpected error: {}", err);
}

#[tokio::test]
async fn test_extract_empty_projects() {
    let fixture = Fixture::new(StubExtractor::returning(single_record()));
    let manager = fixture.manager(fixture.config().with_projects(Vec::<String>::new()));

    let records = manager.get_records().await.unwrap();

    assert!(records.is_empty());
    assert!(fixture.stub.calls().is_empty());
}

#[tokio::test]
async fn test_extract() {
    let fixture = Fixture::new(StubExtractor::returning(single_record()));
    let manager = fixture.manager(
        fixture
            .config()
            .with_dry_run(true)
            .with_projects(["bazonk"])
            .with_extract_from("1999-12-19")
            .with_extract_to("2015-12-19"),
    );

    let records = manager.get_records().await.unwrap();

    assert_eq!(
        fixture.stub.calls(),
        vec![("bazonk".to_string(), date("1999-12-19"), date("2015-12-19"))]
    );
    assert_eq!(records, single_record());
}

#[tokio::test]
async fn test_extract_no_from() {
    let fixture = Fixture::new(StubExtractor::returning(single_record()));
    let manager = fixture.manager(
        fixture
            .config()
            .with_dry_run(true)
            .with_projects(["bazonk"])
            .with_extract_to("2015-12-19"),
    );

    let records = manager.get_records().await.unwrap();

    assert_eq!(
        fixture.stub.calls(),
        vec![("bazonk".to_string(), date("1970-01-01"), date("2015-12-19"))]
    );
    assert_eq!(records, single_record());
}

#[tokio::test]
async fn test_get_records_with_lastrun() {
    let fixture = Fixture::new(StubExtractor::returning(single_record()));
    fixture.store().write("bazonk", "1999-12-11").unwrap();
    let manager = fixture.manager(
        fixture
            .config()
            .with_dry_run(true)
            .with_projects(["bazonk"])
            .with_extract_to("2015-12-19"),
    );

    assert_eq!(manager.lastrun("bazonk").unwrap(), date("1999-12-11"));
    let records = manager.get_records().await.unwrap();

    assert_eq!(
        fixture.stub.calls(),
        vec![("bazonk".to_string(), date("1999-12-11"), date("2015-12-19"))]
    );
    assert_eq!(records, single_record());
}

#[tokio::test]
async fn test_get_records_wrong_extract_from() {
    let fixture = Fixture::new(StubExtractor::returning(single_record()));
    let manager = fixture.manager(
        fixture
            .config()
            .with_projects(["foo"])
            .with_extract_from("1999-12-99"),
    );

    let err = manager.get_records().await.unwrap_err();

    assert_invalid_date(&err);
    assert!(fixture.stub.calls().is_empty());
}

#[tokio::test]
async fn test_empty_projects_still_validate_extract_from() {
    let fixture = Fixture::new(StubExtractor::returning(single_record()));
    let manager = fixture.manager(
        fixture
            .config()
            .with_projects(Vec::<String>::new())
            .with_extract_from("1999-12-99"),
    );

    let err = manager.get_records().await.unwrap_err();

    assert_eq!(
        err.downcast_ref::<ExtractError>(),
        Some(&ExtractError::InvalidDate {
            field: "extract_from".to_string(),
            value: "1999-12-99".to_string(),
        })
    );
    assert!(fixture.stub.calls().is_empty());
}

#[tokio::test]
async fn test_get_records_wrong_extract_to() {
    let fixture = Fixture::new(StubExtractor::returning(single_record()));
    let manager = fixture.manager(fixture.config().with_extract_to("1999-12-99"));

    let err = manager.get_records().await.unwrap_err();

    assert_invalid_date(&err);
    assert_eq!(
        err.downcast_ref::<ExtractError>(),
        Some(&ExtractError::InvalidDate {
            field: "extract_to".to_string(),
            value: "1999-12-99".to_string(),
        })
    );
}

#[tokio::test]
async fn test_get_records_wrong_extract_to_with_valid_from() {
    let fixture = Fixture::new(StubExtractor::returning(single_record()));
    let manager = fixture.manager(
        fixture
            .config()
            .with_projects(["foo"])
            .with_extract_from("1999-12-19")
            .with_extract_to("not a date"),
    );

    let err = manager.get_records().await.unwrap_err();

    assert_invalid_date(&err);
    assert!(fixture.stub.calls().is_empty());
}

#[test]
fn test_lastrun_does_not_exist() {
    let fixture = Fixture::new(StubExtractor::default());
    let manager = fixture.manager(fixture.config());

    let lastrun = manager.lastrun("5c8bc02a0cb3474daf1a1a1e09bdb85a").unwrap();

    assert_eq!(lastrun, epoch());
    assert_eq!(
        lastrun,
        NaiveDate::from_ymd_opt(1970, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    );
}

#[test]
fn test_lastrun_exists() {
    let fixture = Fixture::new(StubExtractor::default());
    let expected = NaiveDate::from_ymd_opt(2014, 12, 10)
        .unwrap()
        .and_hms_micro_opt(13, 10, 26, 664598)
        .unwrap();
    std::fs::write(
        fixture.spool.path().join("lastrun.foo"),
        "2014-12-10 13:10:26.664598",
    )
    .unwrap();
    let manager = fixture.manager(fixture.config());

    assert_eq!(manager.lastrun("foo").unwrap(), expected);
}

#[test]
fn test_lastrun_is_invalid() {
    let fixture = Fixture::new(StubExtractor::default());
    std::fs::write(fixture.spool.path().join("lastrun.foo"), "foo").unwrap();
    let manager = fixture.manager(fixture.config());

    let err = manager.lastrun("foo").unwrap_err();

    assert_invalid_date(&err);
}

#[tokio::test]
async fn test_invalid_lastrun_aborts_get_records() {
    let fixture = Fixture::new(StubExtractor::returning(single_record()));
    fixture.store().write("bar", "garbage").unwrap();
    let manager = fixture.manager(
        fixture
            .config()
            .with_projects(["foo", "bar", "baz"])
            .with_extract_to("2015-12-19"),
    );

    let err = manager.get_records().await.unwrap_err();

    assert_invalid_date(&err);
    let projects: Vec<_> = fixture.stub.calls().into_iter().map(|c| c.0).collect();
    assert_eq!(projects, vec!["foo"]);
}

#[test]
fn test_lastrun_round_trip() {
    let fixture = Fixture::new(StubExtractor::default());
    let manager = fixture.manager(fixture.config());

    for value in [
        "2015-12-19",
        "2014-12-10 13:10:26.664598",
        "2001-02-03T04:05:06.7",
    ] {
        let ts = date(value);
        manager.write_lastrun("roundtrip", ts).unwrap();
        assert_eq!(manager.lastrun("roundtrip").unwrap(), ts);
    }
}

#[tokio::test]
async fn test_dry_run_leaves_lastrun_untouched() {
    let fixture = Fixture::new(StubExtractor::returning(single_record()));
    let path = fixture.store().path_for("bazonk");
    std::fs::write(&path, "1999-12-11\n").unwrap();
    let manager = fixture.manager(
        fixture
            .config()
            .with_dry_run(true)
            .with_projects(["bazonk", "fresh"])
            .with_extract_to("2015-12-19"),
    );
    let loader = CollectingLoader::default();

    let count = manager.run(&loader).await.unwrap();

    assert_eq!(count, 1);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "1999-12-11\n");
    assert!(!fixture.store().path_for("fresh").exists());
}

#[tokio::test]
async fn test_run_marks_projects_done() {
    let fixture = Fixture::new(StubExtractor::returning(single_record()));
    let manager = fixture.manager(
        fixture
            .config()
            .with_projects(["foo", "bar"])
            .with_extract_to("2015-12-19"),
    );
    let loader = CollectingLoader::default();

    manager.run(&loader).await.unwrap();

    assert_eq!(loader.items.lock().unwrap().len(), 1);
    assert_eq!(manager.lastrun("foo").unwrap(), date("2015-12-19"));
    assert_eq!(manager.lastrun("bar").unwrap(), date("2015-12-19"));

    // The next run resumes where this one ended
    let next = fixture.manager(fixture.config().with_projects(["foo"]));
    next.get_records().await.unwrap();
    let calls = fixture.stub.calls();
    assert_eq!(calls.last().unwrap().1, date("2015-12-19"));
    assert_eq!(calls.last().unwrap().2, date("2020-01-01"));
}

#[tokio::test]
async fn test_extractor_failure_aborts_run() {
    let fixture = Fixture::new(StubExtractor::returning(single_record()).failing_on("bar"));
    let manager = fixture.manager(
        fixture
            .config()
            .with_projects(["foo", "bar", "baz"])
            .with_extract_to("2015-12-19"),
    );
    let loader = CollectingLoader::default();

    let err = manager.run(&loader).await.unwrap_err();

    assert!(err.to_string().contains("backend unavailable for bar"));
    let projects: Vec<_> = fixture.stub.calls().into_iter().map(|c| c.0).collect();
    assert_eq!(projects, vec!["foo", "bar"]);
    assert!(loader.items.lock().unwrap().is_empty());
    assert!(!fixture.store().path_for("foo").exists());
}

#[test]
fn test_unknown_extractor() {
    let fixture = Fixture::new(StubExtractor::default());

    let config = fixture.config().with_extractor("bogus");
    let result = Manager::new(config, &fixture.registry());

    let err = result.err().expect("unknown extractor must fail");
    assert_eq!(
        err.downcast_ref::<ExtractError>(),
        Some(&ExtractError::UnknownExtractor {
            name: "bogus".to_string(),
            available: "stub".to_string(),
        })
    );
}
