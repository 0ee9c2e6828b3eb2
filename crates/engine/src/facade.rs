//! The storage facade: a mailbox-serialized request surface
//!
//! One worker thread owns the [`Storage`] handle and drains a FIFO mailbox.
//! *Calls* send a reply channel and wait on it; *casts* are fire-and-forget.
//! Because calls and casts flow through the same queue, a `get` issued after
//! a `put` cast observes that put — call-after-cast causality.
//!
//! `blocking_read` deliberately bypasses the mailbox: it can park forever,
//! which would wedge every queued request behind it. It obtains the handle
//! through the synchronous `state` call and then drives the table manager
//! directly, exactly as a concurrent snapshot or blocking reader is allowed
//! to (the shared tables, not the mailbox, are the serialization point for
//! those).

use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::JoinHandle;

use tessera_core::{Error, Lookup, Result, Stored, Term, Version};
use tessera_tables::{Tables, TxResult};

use crate::snapshot::OrderSnapshot;
use crate::store::Storage;

enum Request<T: Tables> {
    // Calls
    State {
        reply: Sender<Storage<T>>,
    },
    Get {
        key: Term,
        reply: Sender<Lookup>,
    },
    GetKeyspace {
        prefix: Vec<Term>,
        reply: Sender<Option<Vec<(Term, Term)>>>,
    },
    ReadOrder {
        key: Term,
        reply: Sender<TxResult<Vec<(Term, Version)>>>,
    },
    ReadAtOrder {
        key: Term,
        version: Version,
        reply: Sender<TxResult<Vec<(Term, Stored)>>>,
    },
    SnapshotOrder {
        reply: Sender<TxResult<OrderSnapshot>>,
    },
    // Casts
    Setup,
    Remove,
    EnsureNew,
    Put {
        key: Term,
        value: Term,
    },
    DeleteKey {
        key: Term,
    },
    WriteAtOrder {
        key: Term,
        value: Term,
        version: Version,
    },
    PutSnapshot {
        key: Term,
    },
    Shutdown,
}

/// The spawned facade: owns the worker thread.
///
/// Obtain any number of [`FacadeHandle`]s to talk to it; dropping the
/// `Facade` shuts the worker down after the requests already queued.
pub struct Facade<T: Tables> {
    requests: Sender<Request<T>>,
    worker: Option<JoinHandle<()>>,
}

impl<T: Tables> Facade<T> {
    /// Spawn the mailbox worker around a storage handle.
    pub fn spawn(storage: Storage<T>) -> Facade<T> {
        let (requests, mailbox) = channel();
        let worker = std::thread::Builder::new()
            .name("tessera-storage".to_string())
            .spawn(move || serve(storage, mailbox))
            .expect("failed to spawn storage facade thread");
        Facade {
            requests,
            worker: Some(worker),
        }
    }

    /// A clonable handle onto this facade's mailbox.
    pub fn handle(&self) -> FacadeHandle<T> {
        FacadeHandle {
            requests: self.requests.clone(),
        }
    }
}

impl<T: Tables> Drop for Facade<T> {
    fn drop(&mut self) {
        let _ = self.requests.send(Request::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// A clonable client of the facade mailbox.
pub struct FacadeHandle<T: Tables> {
    requests: Sender<Request<T>>,
}

impl<T: Tables> Clone for FacadeHandle<T> {
    fn clone(&self) -> Self {
        FacadeHandle {
            requests: self.requests.clone(),
        }
    }
}

impl<T: Tables> FacadeHandle<T> {
    fn call<R>(&self, build: impl FnOnce(Sender<R>) -> Request<T>) -> Result<R> {
        let (reply, response) = channel();
        self.requests
            .send(build(reply))
            .map_err(|_| Error::Disconnected("storage facade"))?;
        response
            .recv()
            .map_err(|_| Error::Disconnected("storage facade"))
    }

    fn cast(&self, request: Request<T>) -> Result<()> {
        self.requests
            .send(request)
            .map_err(|_| Error::Disconnected("storage facade"))
    }

    /// Call: the underlying storage handle.
    pub fn state(&self) -> Result<Storage<T>> {
        self.call(|reply| Request::State { reply })
    }

    /// Call: current value of a key.
    pub fn get(&self, key: &Term) -> Result<Lookup> {
        self.call(|reply| Request::Get {
            key: key.clone(),
            reply,
        })
    }

    /// Call: the keyspace under a prefix, or `None` on any absence.
    pub fn get_keyspace(&self, prefix: &[Term]) -> Result<Option<Vec<(Term, Term)>>> {
        self.call(|reply| Request::GetKeyspace {
            prefix: prefix.to_vec(),
            reply,
        })
    }

    /// Call: transactional order rows for a key.
    pub fn read_order(&self, key: &Term) -> Result<TxResult<Vec<(Term, Version)>>> {
        self.call(|reply| Request::ReadOrder {
            key: key.clone(),
            reply,
        })
    }

    /// Call: transactional qualified rows at a `(key, version)` coordinate.
    pub fn read_at_order(
        &self,
        key: &Term,
        version: Version,
    ) -> Result<TxResult<Vec<(Term, Stored)>>> {
        self.call(|reply| Request::ReadAtOrder {
            key: key.clone(),
            version,
            reply,
        })
    }

    /// Call: a consistent snapshot of the order map.
    pub fn snapshot_order(&self) -> Result<TxResult<OrderSnapshot>> {
        self.call(|reply| Request::SnapshotOrder { reply })
    }

    /// Cast: ensure the tables exist.
    pub fn setup(&self) -> Result<()> {
        self.cast(Request::Setup)
    }

    /// Cast: drop the tables, publishing deletion events.
    pub fn remove(&self) -> Result<()> {
        self.cast(Request::Remove)
    }

    /// Cast: drop and recreate the tables.
    pub fn ensure_new(&self) -> Result<()> {
        self.cast(Request::EnsureNew)
    }

    /// Cast: versioned write.
    pub fn put(&self, key: &Term, value: Term) -> Result<()> {
        self.cast(Request::Put {
            key: key.clone(),
            value,
        })
    }

    /// Cast: versioned tombstone write.
    pub fn delete_key(&self, key: &Term) -> Result<()> {
        self.cast(Request::DeleteKey { key: key.clone() })
    }

    /// Cast: forced write at an explicit version.
    pub fn write_at_order(&self, key: &Term, value: Term, version: Version) -> Result<()> {
        self.cast(Request::WriteAtOrder {
            key: key.clone(),
            value,
            version,
        })
    }

    /// Cast: snapshot the order map and store it under `key`.
    pub fn put_snapshot(&self, key: &Term) -> Result<()> {
        self.cast(Request::PutSnapshot { key: key.clone() })
    }

    /// Park until `[version, key | 0]` is written, off the mailbox.
    ///
    /// Acquires the storage handle via `state` and then works against the
    /// table manager directly, so queued requests keep flowing while this
    /// caller waits.
    pub fn blocking_read(&self, qkey: &Term) -> Result<Lookup> {
        self.state()?.blocking_read(qkey)
    }
}

fn serve<T: Tables>(storage: Storage<T>, mailbox: Receiver<Request<T>>) {
    while let Ok(request) = mailbox.recv() {
        match request {
            Request::State { reply } => {
                let _ = reply.send(storage.clone());
            }
            Request::Get { key, reply } => {
                let _ = reply.send(storage.get(&key));
            }
            Request::GetKeyspace { prefix, reply } => {
                let _ = reply.send(storage.get_keyspace(&prefix));
            }
            Request::ReadOrder { key, reply } => {
                let _ = reply.send(storage.read_order_rows(&key));
            }
            Request::ReadAtOrder {
                key,
                version,
                reply,
            } => {
                let _ = reply.send(storage.read_at_order_rows(&key, version));
            }
            Request::SnapshotOrder { reply } => {
                let _ = reply.send(storage.snapshot_order());
            }
            Request::Setup => {
                storage.setup();
            }
            Request::Remove => {
                storage.remove();
            }
            Request::EnsureNew => {
                storage.ensure_new();
            }
            Request::Put { key, value } => {
                if let TxResult::Aborted(reason) = storage.put(&key, value) {
                    tracing::warn!(key = %key, reason = %reason, "put aborted");
                }
            }
            Request::DeleteKey { key } => {
                if let TxResult::Aborted(reason) = storage.delete(&key) {
                    tracing::warn!(key = %key, reason = %reason, "delete aborted");
                }
            }
            Request::WriteAtOrder {
                key,
                value,
                version,
            } => {
                if let TxResult::Aborted(reason) = storage.write_at_order(&key, value, version) {
                    tracing::warn!(key = %key, %version, reason = %reason, "write_at_order aborted");
                }
            }
            Request::PutSnapshot { key } => {
                if let TxResult::Aborted(reason) = storage.put_snapshot(&key) {
                    tracing::warn!(key = %key, reason = %reason, "put_snapshot aborted");
                }
            }
            Request::Shutdown => break,
        }
    }
    tracing::debug!("storage facade stopped");
}
