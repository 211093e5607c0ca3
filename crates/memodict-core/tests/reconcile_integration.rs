//! Integration tests for reconciliation: merge semantics, the version
//! guard, and pull/push cycles against an in-process remote.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use memodict_core::{
    plan_merge, Collection, Event, Grade, LookupResult, Reconciler, RemoteStore, ReviewPolicy,
    SyncError, SyncOutcome, Word, WordDb,
};

fn collection() -> Collection {
    Collection::with_db(WordDb::open_memory().unwrap(), ReviewPolicy::default()).unwrap()
}

fn lookup(term: &str) -> LookupResult {
    LookupResult {
        word: term.to_string(),
        ..Default::default()
    }
}

fn remote_word(id: &str, term: &str, created_at: i64) -> Word {
    let mut w = Word::new(lookup(term), created_at);
    w.id = id.to_string();
    w.updated_at = None;
    w
}

fn keyed(words: &[Word]) -> HashMap<String, Word> {
    words.iter().map(|w| (w.id.clone(), w.clone())).collect()
}

/// In-process remote backend for tests. Clones share state, so a test can
/// keep a handle after moving the remote into a reconciler.
#[derive(Default, Clone)]
struct FakeRemote {
    snapshot: Arc<Mutex<Option<HashMap<String, Word>>>>,
    pushed: Arc<Mutex<Vec<Vec<Word>>>>,
    fail_fetch: bool,
}

impl FakeRemote {
    fn with_snapshot(words: &[Word]) -> Self {
        let map = words.iter().map(|w| (w.id.clone(), w.clone())).collect();
        Self {
            snapshot: Arc::new(Mutex::new(Some(map))),
            ..Default::default()
        }
    }
}

impl RemoteStore for FakeRemote {
    async fn fetch_snapshot(&self) -> Result<Option<HashMap<String, Word>>, SyncError> {
        if self.fail_fetch {
            return Err(SyncError::RemoteUnavailable("fake outage".to_string()));
        }
        Ok(self.snapshot.lock().unwrap().clone())
    }

    async fn push_snapshot(&self, words: &[Word]) -> Result<(), SyncError> {
        self.pushed.lock().unwrap().push(words.to_vec());
        let map = words.iter().map(|w| (w.id.clone(), w.clone())).collect();
        *self.snapshot.lock().unwrap() = Some(map);
        Ok(())
    }
}

#[tokio::test]
async fn pull_applies_the_spec_scenario() {
    // local {A(created=1), B(created=2)}, remote {A(created=5), C(created=3)}
    // => local {A(5), C(3)}: B removed, A updated, C added.
    let mut col = collection();
    let seed = keyed(&[remote_word("a", "apple", 1), remote_word("b", "banana", 2)]);
    let plan = plan_merge(&[], &seed);
    col.apply_merge(plan, 0).unwrap();

    let remote = FakeRemote::with_snapshot(&[
        remote_word("a", "apple", 5),
        remote_word("c", "cherry", 3),
    ]);
    let mut reconciler = Reconciler::new(remote);

    let outcome = reconciler.pull(&mut col).await.unwrap();
    assert_eq!(
        outcome,
        SyncOutcome::Applied {
            upserts: 2,
            deletes: 1
        }
    );

    let mut ids: Vec<String> = col.words().into_iter().map(|w| w.id).collect();
    ids.sort();
    assert_eq!(ids, vec!["a", "c"]);
    assert_eq!(col.get("a").unwrap().created_at, 5);
}

#[tokio::test]
async fn pull_of_identical_snapshot_is_a_noop() {
    let mut col = collection();
    col.add(lookup("stable"), 0).unwrap();
    let version_before = col.version();

    let remote = FakeRemote::with_snapshot(&col.words());
    let mut reconciler = Reconciler::new(remote);

    let outcome = reconciler.pull(&mut col).await.unwrap();
    assert_eq!(outcome, SyncOutcome::NoChange);
    assert_eq!(col.version(), version_before);
}

#[tokio::test]
async fn pull_from_uninitialized_remote_deletes_nothing() {
    let mut col = collection();
    col.add(lookup("precious"), 0).unwrap();

    let remote = FakeRemote::default(); // snapshot: None
    let mut reconciler = Reconciler::new(remote);

    let outcome = reconciler.pull(&mut col).await.unwrap();
    assert_eq!(outcome, SyncOutcome::NoChange);
    assert_eq!(col.len(), 1);
}

#[tokio::test]
async fn fetch_failure_abandons_the_cycle_and_keeps_local_state() {
    let mut col = collection();
    col.add(lookup("survivor"), 0).unwrap();
    let version_before = col.version();

    let remote = FakeRemote {
        fail_fetch: true,
        ..Default::default()
    };
    let mut reconciler = Reconciler::new(remote);

    let err = reconciler.pull(&mut col).await.unwrap_err();
    assert!(matches!(err, SyncError::RemoteUnavailable(_)));
    assert_eq!(col.len(), 1);
    assert_eq!(col.version(), version_before);
    assert!(reconciler.status().last_pull_at.is_none());
}

#[tokio::test]
async fn push_records_the_uploaded_version() {
    let mut col = collection();
    col.add(lookup("uploaded"), 0).unwrap();

    let remote = FakeRemote::default();
    let handle = remote.clone();
    let mut reconciler = Reconciler::new(remote);
    reconciler.push(&col).await.unwrap();

    let pushed = handle.pushed.lock().unwrap();
    assert_eq!(pushed.len(), 1);
    assert_eq!(pushed[0].len(), 1);
    assert_eq!(reconciler.status().last_pushed_version, Some(col.version()));
    assert!(reconciler.status().last_push_at.is_some());
}

#[tokio::test]
async fn own_echo_merges_to_nothing_after_a_cycle() {
    let mut col = collection();
    col.add(lookup("echo"), 0).unwrap();

    let mut reconciler = Reconciler::new(FakeRemote::default());
    reconciler.cycle(&mut col).await.unwrap();
    let version_after_push = col.version();

    // The remote now holds exactly what we pushed; pulling it back while
    // the collection is unchanged must not change or re-notify anything.
    let outcome = reconciler.pull(&mut col).await.unwrap();
    assert_eq!(outcome, SyncOutcome::NoChange);
    assert_eq!(col.version(), version_after_push);
}

#[test]
fn stale_plan_is_dropped_by_the_version_guard() {
    let mut col = collection();
    let observed = col.version();

    // a local mutation lands between fetch and apply
    col.add(lookup("raced"), 0).unwrap();

    let snapshot = keyed(&[remote_word("x", "stale", 9)]);
    let plan = plan_merge(&col.words(), &snapshot);
    let outcome = col.apply_merge(plan, observed).unwrap();

    assert_eq!(outcome, SyncOutcome::Stale);
    assert!(col.get("x").is_none(), "stale plan must not apply");
    assert_eq!(col.len(), 1);
}

#[tokio::test]
async fn sync_applied_event_fires_once_per_merge() {
    let mut col = collection();
    let mut rx = col.subscribe();

    let remote = FakeRemote::with_snapshot(&[remote_word("n", "new", 4)]);
    let mut reconciler = Reconciler::new(remote);
    reconciler.pull(&mut col).await.unwrap();

    assert!(matches!(
        rx.try_recv().unwrap(),
        Event::SyncApplied {
            upserts: 1,
            deletes: 0,
            ..
        }
    ));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn local_reviews_survive_when_local_copy_is_newer() {
    let mut col = collection();
    let id = col.add(lookup("drilled"), 100).unwrap().word().id.clone();
    col.review(&id, Grade::Good, 2_000).unwrap();
    let reviewed = col.get(&id).unwrap().clone();

    // remote still has the pre-review copy of the same word
    let mut stale_copy = reviewed.clone();
    stale_copy.repetitions = 0;
    stale_copy.interval = 0;
    stale_copy.updated_at = Some(100);

    let remote = FakeRemote::with_snapshot(&[stale_copy]);
    let mut reconciler = Reconciler::new(remote);
    let outcome = reconciler.pull(&mut col).await.unwrap();

    assert_eq!(outcome, SyncOutcome::NoChange);
    assert_eq!(col.get(&id).unwrap().repetitions, reviewed.repetitions);
}
