use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use rowcast::driver::memory::{Call, Op};
use rowcast::error::ErrorKind;
use rowcast::prelude::*;

const FIXTURE: &str = r#"{
    "fields": ["id", "customer", "created", "shipped"],
    "types": ["int4", "text", "timestamptz", "date"],
    "rows": [
        ["1", "apple", "2012-06-15 14:30:00", "2012-06-16 01:00:00"],
        ["2", null, "2012-06-15 14:30:00-05:00", null]
    ],
    "insert_id": 2
}"#;

fn adapter() -> Adapter<MemoryHandle> {
    let cursor = MemoryCursor::from_json(FIXTURE).unwrap();
    let settings = Settings::from_toml(
        r#"
        [timezone]
        server = "Europe/Berlin"
        client = "UTC"
        "#,
    )
    .unwrap();
    Adapter::from_settings(MemoryHandle::new().with_result(cursor), &settings)
}

#[tokio::test]
async fn test_query_fixture() {
    let mut adapter = adapter();
    let records = adapter.query("SELECT * FROM orders", vec![]).await.unwrap();

    assert_eq!(records.len(), 2);
    // Berlin is UTC+2 in June
    assert_eq!(
        records[0].get_timestamp("created"),
        Utc.with_ymd_and_hms(2012, 6, 15, 12, 30, 0).single()
    );
    assert_eq!(
        records[1].get_timestamp("created"),
        Utc.with_ymd_and_hms(2012, 6, 15, 19, 30, 0).single()
    );
    assert_eq!(
        records[0].get_date("shipped"),
        chrono::NaiveDate::from_ymd_opt(2012, 6, 15)
    );
    assert!(records[1].is_null("customer"));
    assert!(records[1].is_null("shipped"));
}

#[tokio::test]
async fn test_results_can_be_reread() {
    let mut adapter = adapter();
    let affected = adapter.execute("SELECT * FROM orders", vec![]).await.unwrap();
    assert_eq!(affected, 2);

    let mut results = adapter.results().unwrap();
    assert_eq!(results.rows(), 2);
    assert_eq!(results.columns(), 4);
    assert_eq!(results.fields(), &["id", "customer", "created", "shipped"]);
    assert_eq!(results.field_types(), vec!["integer", "text", "timestamp", "date"]);
    assert_eq!(results.insert_id(), Some(2));

    let ids: Vec<i64> = results
        .project(|r| Ok(r.get_i64("id").unwrap_or_default()))
        .unwrap()
        .collect::<CastResult<_>>()
        .unwrap();
    assert_eq!(ids, vec![1, 2]);

    let again: Vec<Record> = results.load().unwrap();
    assert_eq!(again.len(), 2);
}

#[tokio::test]
async fn test_execute_passes_binds() {
    let mut adapter = Adapter::new(MemoryHandle::new());
    adapter
        .execute("DELETE FROM orders WHERE id = $1", vec![Bind::from(9)])
        .await
        .unwrap();

    assert_eq!(
        adapter.handle().unwrap().calls(),
        &[Call::Execute(
            "DELETE FROM orders WHERE id = $1".to_string(),
            vec![Bind::Int(9)]
        )]
    );
}

#[tokio::test]
async fn test_transaction_through_adapter() {
    let mut adapter = adapter();
    adapter.begin(None).unwrap();

    let out: CastResult<u64> = adapter.transaction(Some("batch"), |h| {
        let n = h.execute("UPDATE orders SET shipped = now()", &[])?;
        Ok(n)
    });
    assert_eq!(out.unwrap(), 2);
    assert_eq!(adapter.open_transactions().unwrap(), 1);

    adapter.commit(None).unwrap();
    assert_eq!(adapter.open_transactions().unwrap(), 0);
}

#[tokio::test]
async fn test_failed_control_call_is_transaction_error() {
    let mut handle = MemoryHandle::new();
    handle.fail_on(Op::Commit);
    let mut adapter = Adapter::new(handle);

    adapter.begin(Some("sp")).unwrap();
    let err = adapter.commit(Some("sp")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transaction);
    assert!(err.to_string().contains("commit sp"));
}

#[tokio::test]
async fn test_closed_adapter() {
    let mut adapter = adapter();
    adapter.close().unwrap();
    assert!(adapter.is_closed());

    let err = adapter.execute("SELECT 1", vec![]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidHandle);
    assert_eq!(adapter.rollback(None).unwrap_err().kind(), ErrorKind::InvalidHandle);
    assert_eq!(adapter.open_transactions().unwrap_err().kind(), ErrorKind::InvalidHandle);
}
