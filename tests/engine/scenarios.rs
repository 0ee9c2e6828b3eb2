//! End-to-end scenarios: the observable behavior of one storage handle.

use std::sync::Arc;
use std::time::Duration;

use crate::common::*;
use tessera::{Error, Lookup, MemTables, Term, Version};

#[test]
fn simple_put_get() {
    let storage = open();
    storage.put(&Term::text("x"), Term::nat(42)).committed().unwrap();

    assert_eq!(storage.get(&Term::text("x")), Lookup::Present(Term::nat(42)));

    // Both tables carry the write: order at version 1, qualified at [1, x | 0].
    let rows = storage.read_order_rows(&Term::text("x")).committed().unwrap();
    assert_eq!(rows, vec![(Term::text("x"), Version::FIRST)]);
    assert_eq!(
        storage.read_at_order(&Term::text("x"), Version::FIRST),
        Lookup::Present(Term::nat(42))
    );
}

#[test]
fn version_bump_retains_history() {
    let storage = open();
    for n in 1..=3u64 {
        storage.put(&Term::text("x"), Term::nat(n)).committed().unwrap();
    }

    assert_eq!(storage.get(&Term::text("x")), Lookup::Present(Term::nat(3)));
    // The intermediate row holds the second write.
    assert_eq!(
        storage.read_at_order(&Term::text("x"), Version::new(2).unwrap()),
        Lookup::Present(Term::nat(2))
    );
}

#[test]
fn tombstone_reads_absent_but_advances_order() {
    let storage = open();
    storage.put(&Term::text("x"), Term::nat(7)).committed().unwrap();
    storage.delete(&Term::text("x")).committed().unwrap();

    assert_eq!(storage.get(&Term::text("x")), Lookup::Absent);
    let rows = storage.read_order_rows(&Term::text("x")).committed().unwrap();
    assert_eq!(rows, vec![(Term::text("x"), Version::new(2).unwrap())]);
}

#[test]
fn blocking_read_waits_for_writer() {
    let storage = open();
    let reader = storage.clone();
    let join = std::thread::spawn(move || reader.blocking_read(&qkey(1, "y")));

    std::thread::sleep(Duration::from_millis(50));
    storage
        .put(&Term::text("y"), Term::text("hello"))
        .committed()
        .unwrap();

    assert_eq!(
        join.join().unwrap().unwrap(),
        Lookup::Present(Term::text("hello"))
    );
}

#[test]
fn blocking_read_version_zero_rejects_immediately() {
    let storage = open();
    assert!(matches!(
        storage.blocking_read(&qkey(0, "z")),
        Err(Error::BadVersion)
    ));
}

#[test]
fn keyspace_with_partial_absence_is_absent() {
    let storage = open();
    let ka = Term::list([Term::text("a"), Term::text("1")]);
    let kb = Term::list([Term::text("a"), Term::text("2")]);
    storage.put(&ka, Term::nat(10)).committed().unwrap();
    storage.put(&kb, Term::nat(20)).committed().unwrap();
    storage.delete(&ka).committed().unwrap();

    assert_eq!(storage.get_keyspace(&[Term::text("a")]), None);
}

#[test]
fn keyspace_without_absence_lists_pairs() {
    let storage = open();
    let ka = Term::list([Term::text("a"), Term::text("1")]);
    let kb = Term::list([Term::text("a"), Term::text("2")]);
    storage.put(&ka, Term::nat(10)).committed().unwrap();
    storage.put(&kb, Term::nat(20)).committed().unwrap();

    assert_eq!(
        storage.get_keyspace(&[Term::text("a")]),
        Some(vec![(ka, Term::nat(10)), (kb, Term::nat(20))])
    );
}

#[test]
fn snapshot_is_stable_across_later_writes() {
    let storage = open();
    let key = Term::text("k");
    storage.put(&key, Term::text("v1")).committed().unwrap();
    let snapshot = storage.snapshot_order().committed().unwrap();
    storage.put(&key, Term::text("v2")).committed().unwrap();

    assert_eq!(
        storage.get_at_snapshot(&snapshot, &key),
        Lookup::Present(Term::text("v1"))
    );
    assert_eq!(storage.get(&key), Lookup::Present(Term::text("v2")));
}

#[test]
fn namespace_isolation_on_shared_tables() {
    let tables = Arc::new(MemTables::new());
    let a = open_namespaced(&tables, &["A"]);
    let b = open_namespaced(&tables, &["B"]);

    let key = Term::text("k");
    a.put(&key, Term::nat(1)).committed().unwrap();
    b.put(&key, Term::nat(2)).committed().unwrap();

    assert_eq!(a.get(&key), Lookup::Present(Term::nat(1)));
    assert_eq!(b.get(&key), Lookup::Present(Term::nat(2)));
}

// ============================================================================
// Laws
// ============================================================================

#[test]
fn law_delete_is_put() {
    let storage = open();
    let key = Term::text("k");
    storage.put(&key, Term::nat(1)).committed().unwrap();

    let before = storage.read_order_rows(&key).committed().unwrap()[0].1;
    storage.delete(&key).committed().unwrap();
    let after = storage.read_order_rows(&key).committed().unwrap()[0].1;

    assert_eq!(storage.get(&key), Lookup::Absent);
    assert_eq!(after.get(), before.get() + 1);
}

#[test]
fn law_idempotent_setup() {
    let storage = open();
    storage.put(&Term::text("k"), Term::nat(1)).committed().unwrap();

    assert!(storage.setup().all_ok());
    assert!(storage.setup().all_ok());
    assert_eq!(storage.get(&Term::text("k")), Lookup::Present(Term::nat(1)));
}

#[test]
fn law_snapshot_determined_by_pinned_version() {
    let storage = open();
    let key = Term::text("k");
    storage.put(&key, Term::text("v1")).committed().unwrap();
    let snapshot = storage.snapshot_order().committed().unwrap();

    let pinned = storage.in_snapshot(&snapshot, &key).unwrap();
    for n in 0..5u64 {
        storage.put(&key, Term::nat(n)).committed().unwrap();
        assert_eq!(
            storage.get_at_snapshot(&snapshot, &key),
            storage.read_at_order(&key, pinned)
        );
    }
}

#[test]
fn law_order_is_max_qualified_version() {
    let storage = open();
    let key = Term::text("k");
    for n in 1..=4u64 {
        storage.put(&key, Term::nat(n)).committed().unwrap();
    }

    let latest = storage.read_order_rows(&key).committed().unwrap()[0].1;
    assert_eq!(latest.get(), 4);
    // Every version up to the order row exists; nothing above it does.
    for v in 1..=4u64 {
        assert!(storage
            .read_at_order(&key, Version::new(v).unwrap())
            .is_present());
    }
    assert!(storage
        .read_at_order(&key, Version::new(5).unwrap())
        .is_absent());
}
