use shopreach_core::{GroupRecord, PostStatus, ProductRecord};

use super::*;

fn product(id: &str) -> ProductRecord {
    let mut record = ProductRecord::new("jh76f651k30k32z9112c2m9g257am5xa");
    record.id = Some(id.to_owned());
    record
}

fn dir() -> (tempfile::TempDir, StoreDir) {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store_dir = StoreDir::new(tmp.path(), "groups.json");
    (tmp, store_dir)
}

#[test]
fn store_files_are_named_by_key() {
    let store_dir = StoreDir::new("/data", "my_groups.json");
    assert_eq!(store_dir.products(26).path(), Path::new("/data/cat_26.json"));
    assert_eq!(store_dir.groups().path(), Path::new("/data/my_groups.json"));
    assert_eq!(
        store_dir.delivery_rates().path(),
        Path::new("/data/delivery_rates.json")
    );
}

#[test]
fn load_of_missing_file_is_empty() {
    let (_tmp, store_dir) = dir();
    assert!(store_dir.products(1).load().is_empty());
}

#[test]
fn load_of_malformed_file_is_empty() {
    let (_tmp, store_dir) = dir();
    let store = store_dir.products(1);
    fs::write(store.path(), "[{\"category\": \"c1\", ").unwrap();
    assert!(store.load().is_empty());
}

#[test]
fn load_of_non_array_json_is_empty() {
    let (_tmp, store_dir) = dir();
    let store = store_dir.products(1);
    fs::write(store.path(), r#"{"category": "c1"}"#).unwrap();
    assert!(store.load().is_empty());
}

#[test]
fn append_adds_record_once_and_keeps_order() {
    let (_tmp, store_dir) = dir();
    let store = store_dir.products(3);
    store.save(&[product("a"), product("b")]).unwrap();

    store.append(&product("c")).unwrap();

    let ids: Vec<_> = store
        .load()
        .into_iter()
        .map(|r| r.id.unwrap_or_default())
        .collect();
    assert_eq!(ids, ["a", "b", "c"]);
}

#[test]
fn append_creates_missing_data_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let store_dir = StoreDir::new(tmp.path().join("nested").join("data"), "groups.json");
    store_dir.products(7).append(&product("x")).unwrap();
    assert_eq!(store_dir.products(7).load().len(), 1);
}

#[test]
fn append_to_corrupt_store_keeps_the_old_file_aside() {
    let (_tmp, store_dir) = dir();
    let store = store_dir.products(2);
    fs::write(store.path(), "not json").unwrap();

    store.append(&product("fresh")).unwrap();

    assert_eq!(store.load(), vec![product("fresh")]);
    let aside = store.path().with_file_name("cat_2.json.corrupt");
    assert_eq!(fs::read_to_string(aside).unwrap(), "not json");
}

#[test]
fn repeated_corruption_keeps_every_earlier_copy() {
    let (tmp, store_dir) = dir();
    let store = store_dir.products(2);

    fs::write(store.path(), "first broken payload").unwrap();
    store.append(&product("one")).unwrap();
    fs::write(store.path(), "second broken payload").unwrap();
    store.append(&product("two")).unwrap();

    assert_eq!(store.load(), vec![product("two")]);
    assert_eq!(
        fs::read_to_string(tmp.path().join("cat_2.json.corrupt")).unwrap(),
        "first broken payload"
    );
    assert_eq!(
        fs::read_to_string(tmp.path().join("cat_2.json.corrupt.1")).unwrap(),
        "second broken payload"
    );
}

#[test]
fn unreadable_store_is_an_error_and_left_in_place() {
    let (tmp, store_dir) = dir();
    let store = store_dir.products(4);
    fs::create_dir(store.path()).unwrap();

    assert!(store.load().is_empty());
    let err = store.append(&product("x")).unwrap_err();

    assert!(matches!(err, StoreError::Io { .. }));
    assert!(store.path().is_dir());
    assert!(!tmp.path().join("cat_4.json.corrupt").exists());
    assert!(store.merge_new(vec![product("y")]).is_err());
}

#[test]
fn save_leaves_no_temporary_file_behind() {
    let (tmp, store_dir) = dir();
    store_dir.products(1).save(&[product("a")]).unwrap();
    let names: Vec<_> = fs::read_dir(tmp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, ["cat_1.json"]);
}

#[test]
fn non_ascii_text_is_written_verbatim() {
    let (_tmp, store_dir) = dir();
    let store = store_dir.products(1);
    let mut record = product("a");
    record.name = Some("حقيبة ظهر جلدية".to_owned());
    store.append(&record).unwrap();

    let raw = fs::read_to_string(store.path()).unwrap();
    assert!(raw.contains("حقيبة ظهر جلدية"));
    assert_eq!(store.load()[0].name, record.name);
}

#[test]
fn merge_new_skips_known_and_repeated_keys() {
    let (_tmp, store_dir) = dir();
    let store = store_dir.groups();
    store
        .save(&[GroupRecord::discovered("old", "https://fb/groups/1/", "10")])
        .unwrap();

    let report = store
        .merge_new(vec![
            GroupRecord::discovered("old again", "https://fb/groups/1/", "10"),
            GroupRecord::discovered("new", "https://fb/groups/2/", "20"),
            GroupRecord::discovered("new twice", "https://fb/groups/2/", "20"),
        ])
        .unwrap();

    assert_eq!(
        report,
        MergeReport {
            added: 1,
            duplicates: 2,
            total: 2
        }
    );
    let names: Vec<_> = store.load().into_iter().map(|g| g.name).collect();
    assert_eq!(names, ["old", "new"]);
}

#[test]
fn merge_new_preserves_existing_bookkeeping() {
    let (_tmp, store_dir) = dir();
    let store = store_dir.groups();
    let mut posted = GroupRecord::discovered("posted", "https://fb/groups/5/", "1K");
    posted.timestamp = 1_717_000_000;
    posted.post_status = PostStatus::Published;
    store.save(std::slice::from_ref(&posted)).unwrap();

    store
        .merge_new(vec![GroupRecord::discovered("x", "https://fb/groups/6/", "2")])
        .unwrap();

    assert_eq!(store.load()[0], posted);
}

#[test]
fn keys_ignore_records_without_id() {
    let (_tmp, store_dir) = dir();
    let store = store_dir.products(1);
    store
        .save(&[product("a"), ProductRecord::new("c1"), product("b")])
        .unwrap();
    let keys = store.keys();
    assert_eq!(keys.len(), 2);
    assert!(keys.contains("a") && keys.contains("b"));
}
