use flowrun_store::{SqliteStore, SAMPLE_WORKFLOW_ID};

#[test]
fn seeded_rows_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("flowrun.db");

    {
        let store = SqliteStore::open(&path).unwrap();
        assert!(store.seed().unwrap());
    }
    assert!(path.exists());

    let store = SqliteStore::open(&path).unwrap();
    assert!(!store.seed().unwrap());
    let wf = store.load(SAMPLE_WORKFLOW_ID).unwrap().unwrap();
    assert_eq!(wf.name, "Weather Alert Workflow");
    assert_eq!(wf.edges.len(), 6);
}
