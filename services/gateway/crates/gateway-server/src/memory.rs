//! In-process port implementations.
//!
//! Test doubles for the router and CLI wire tests, compiled only with the
//! `test-support` feature. Each one can be switched into a failing mode to
//! exercise degraded paths.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use imgrelay_common::{ObjectKey, UploadUrlResponse};

use crate::error::UpstreamError;
use crate::ports::{InstanceInspector, Namespace, ObjectStore, Presigner};

// ── MemoryStore ───────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<Namespace, BTreeSet<String>>>,
    fail_reads: AtomicBool,
    fail_deletes: AtomicBool,
    delete_calls: AtomicUsize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, namespace: Namespace, key: &str) {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(namespace)
            .or_default()
            .insert(key.to_string());
    }

    #[must_use]
    pub fn keys(&self, namespace: Namespace) -> Vec<String> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&namespace)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Makes `exists` and `list_keys` fail until switched back.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Number of `delete_keys` batches issued so far.
    #[must_use]
    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    fn check_reads(&self) -> Result<(), UpstreamError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(UpstreamError::Unavailable("memory store: reads disabled".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn exists(&self, namespace: Namespace, key: &ObjectKey) -> Result<bool, UpstreamError> {
        self.check_reads()?;
        Ok(self
            .objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&namespace)
            .is_some_and(|set| set.contains(key.as_str())))
    }

    async fn list_keys(&self, namespace: Namespace) -> Result<Vec<String>, UpstreamError> {
        self.check_reads()?;
        Ok(self.keys(namespace))
    }

    async fn delete_keys(
        &self,
        namespace: Namespace,
        keys: &[String],
    ) -> Result<(), UpstreamError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(UpstreamError::PartialDelete {
                failed: keys.len(),
                requested: keys.len(),
            });
        }
        if let Some(set) = self
            .objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&namespace)
        {
            for key in keys {
                set.remove(key);
            }
        }
        Ok(())
    }
}

// ── CountingPresigner ─────────────────────────────────────────────────────────

/// Wraps a presigner, counting calls and optionally failing them.
#[derive(Debug)]
pub struct CountingPresigner<P> {
    inner: P,
    fail: AtomicBool,
    posts: AtomicUsize,
    gets: AtomicUsize,
}

impl<P: Presigner> CountingPresigner<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            fail: AtomicBool::new(false),
            posts: AtomicUsize::new(0),
            gets: AtomicUsize::new(0),
        }
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn post_calls(&self) -> usize {
        self.posts.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), UpstreamError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(UpstreamError::Signing("signer disabled".into()));
        }
        Ok(())
    }
}

impl<P: Presigner> Presigner for CountingPresigner<P> {
    fn presign_post(
        &self,
        namespace: Namespace,
        key: &ObjectKey,
        now: DateTime<Utc>,
    ) -> Result<UploadUrlResponse, UpstreamError> {
        self.posts.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.presign_post(namespace, key, now)
    }

    fn presign_get(
        &self,
        namespace: Namespace,
        key: &ObjectKey,
        now: DateTime<Utc>,
    ) -> Result<String, UpstreamError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.presign_get(namespace, key, now)
    }
}

// ── FixedInspector ────────────────────────────────────────────────────────────

/// Reports a settable instance state.
#[derive(Debug)]
pub struct FixedInspector {
    state: Mutex<Result<Option<String>, String>>,
}

impl FixedInspector {
    #[must_use]
    pub fn state(name: &str) -> Self {
        Self {
            state: Mutex::new(Ok(Some(name.to_string()))),
        }
    }

    /// The instance is absent from the provider's response.
    #[must_use]
    pub fn missing() -> Self {
        Self {
            state: Mutex::new(Ok(None)),
        }
    }

    #[must_use]
    pub fn failing(reason: &str) -> Self {
        Self {
            state: Mutex::new(Err(reason.to_string())),
        }
    }

    pub fn set(&self, name: &str) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = Ok(Some(name.to_string()));
    }
}

#[async_trait]
impl InstanceInspector for FixedInspector {
    async fn instance_state(&self, _instance_id: &str) -> Result<Option<String>, UpstreamError> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .map_err(UpstreamError::Unavailable)
    }
}
