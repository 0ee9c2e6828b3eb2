//! Published event behavior: tags, outcomes, ordering, and the no-sink path.

use crate::common::*;
use tessera::{Lookup, Outcome, Stored, StorageEvent, Term, Version};

#[test]
fn put_publishes_key_value_and_outcome() {
    let (storage, events) = open_with_events();
    storage.put(&Term::text("x"), Term::nat(1)).committed().unwrap();

    assert_eq!(
        events.recv().unwrap(),
        StorageEvent::Put {
            key: Term::text("x"),
            value: Stored::Term(Term::nat(1)),
            outcome: Outcome::Ok,
        }
    );
}

#[test]
fn delete_publishes_tombstone_put() {
    let (storage, events) = open_with_events();
    storage.put(&Term::text("x"), Term::nat(1)).committed().unwrap();
    storage.delete(&Term::text("x")).committed().unwrap();

    let _put = events.recv().unwrap();
    assert_eq!(
        events.recv().unwrap(),
        StorageEvent::Put {
            key: Term::text("x"),
            value: Stored::Tombstone,
            outcome: Outcome::Ok,
        }
    );
}

#[test]
fn write_at_order_publishes_version() {
    let (storage, events) = open_with_events();
    let version = Version::new(9).unwrap();
    storage
        .write_at_order(&Term::text("r"), Term::nat(5), version)
        .committed()
        .unwrap();

    assert_eq!(
        events.recv().unwrap(),
        StorageEvent::WriteAt {
            key: Term::text("r"),
            value: Stored::Term(Term::nat(5)),
            version,
            outcome: Outcome::Ok,
        }
    );
}

#[test]
fn writes_without_sink_do_not_publish_or_fail() {
    let storage = open();
    storage.put(&Term::text("x"), Term::nat(1)).committed().unwrap();
    storage
        .write_at_order(&Term::text("y"), Term::nat(2), Version::FIRST)
        .committed()
        .unwrap();
    assert_eq!(storage.get(&Term::text("x")), Lookup::Present(Term::nat(1)));
}

#[test]
fn events_follow_write_order() {
    let (storage, events) = open_with_events();
    for n in 0..10u64 {
        storage.put(&Term::text("k"), Term::nat(n)).committed().unwrap();
    }

    let seen: Vec<u64> = events
        .try_iter()
        .map(|event| match event {
            StorageEvent::Put {
                value: Stored::Term(t),
                ..
            } => t.as_nat().unwrap(),
            other => panic!("unexpected event {:?}", other),
        })
        .collect();
    assert_eq!(seen, (0..10).collect::<Vec<_>>());
}

#[test]
fn remove_publishes_per_table_deletions() {
    let (storage, events) = open_with_events();
    storage.remove();

    let received: Vec<_> = events.try_iter().collect();
    assert!(matches!(
        received.as_slice(),
        [
            StorageEvent::DeletedQualified { outcome: Outcome::Ok },
            StorageEvent::DeletedOrdering { outcome: Outcome::Ok },
            StorageEvent::DeletedCommitments { outcome: Outcome::Ok },
        ]
    ));
}
