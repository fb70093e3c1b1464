//! Bounded pool of reusable request contexts.
//!
//! At most `capacity` contexts are checked out at once; further acquisitions
//! wait until a lease is released. Released contexts are reset and kept for
//! the next request, so the pool never grows past its capacity.

use crate::error::{ExecutionError, ExecutionResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, trace};
use weave_core::ConfigurationError;

/// State that can be cleared and reused by another request.
pub trait Poolable: Send + 'static {
    /// Clears all request-specific state.
    fn reset(&mut self);
}

/// Pool configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum number of contexts checked out at once.
    pub capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { capacity: 8 }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.capacity == 0 {
            return Err(ConfigurationError::OutOfRange {
                what: "pool capacity",
                min: 1,
                actual: self.capacity,
            });
        }
        Ok(())
    }
}

type Factory<C> = Box<dyn Fn() -> C + Send + Sync>;

struct PoolInner<C> {
    capacity: usize,
    permits: Arc<Semaphore>,
    idle: Mutex<Vec<C>>,
    factory: Factory<C>,
    created: AtomicUsize,
    released: AtomicUsize,
}

impl<C: Poolable> PoolInner<C> {
    fn take_idle(&self) -> C {
        let reused = self
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();
        match reused {
            Some(context) => context,
            None => {
                self.created.fetch_add(1, Ordering::Relaxed);
                (self.factory)()
            }
        }
    }

    fn give_back(&self, mut context: C) {
        context.reset();
        self.idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(context);
        self.released.fetch_add(1, Ordering::Relaxed);
    }
}

/// A bounded, shareable pool of contexts. Clones share the same pool.
pub struct ContextPool<C> {
    inner: Arc<PoolInner<C>>,
}

impl<C: Poolable> ContextPool<C> {
    /// Creates a pool whose contexts are built by `factory` on first use.
    pub fn new<F>(config: PoolConfig, factory: F) -> Result<Self, ConfigurationError>
    where
        F: Fn() -> C + Send + Sync + 'static,
    {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(PoolInner {
                capacity: config.capacity,
                permits: Arc::new(Semaphore::new(config.capacity)),
                idle: Mutex::new(Vec::with_capacity(config.capacity)),
                factory: Box::new(factory),
                created: AtomicUsize::new(0),
                released: AtomicUsize::new(0),
            }),
        })
    }

    /// Checks out a context, waiting while the pool is exhausted.
    pub async fn acquire(&self) -> ExecutionResult<PooledContext<C>> {
        if self.inner.permits.available_permits() == 0 {
            debug!(capacity = self.inner.capacity, "context pool exhausted, waiting");
        }
        let permit = Arc::clone(&self.inner.permits)
            .acquire_owned()
            .await
            .map_err(|_| ExecutionError::PoolClosed)?;
        Ok(self.lease(permit))
    }

    /// Checks out a context if one is available right now.
    pub fn try_acquire(&self) -> Option<PooledContext<C>> {
        let permit = Arc::clone(&self.inner.permits).try_acquire_owned().ok()?;
        Some(self.lease(permit))
    }

    fn lease(&self, permit: OwnedSemaphorePermit) -> PooledContext<C> {
        let context = self.inner.take_idle();
        trace!(in_use = self.in_use(), "context checked out");
        PooledContext {
            context: Some(context),
            permit: Some(permit),
            pool: Arc::clone(&self.inner),
        }
    }

    /// Stops handing out contexts; pending and future acquisitions fail.
    pub fn close(&self) {
        self.inner.permits.close();
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Number of contexts currently checked out.
    pub fn in_use(&self) -> usize {
        self.inner.capacity - self.inner.permits.available_permits()
    }

    /// Number of reset contexts waiting for reuse.
    pub fn idle(&self) -> usize {
        self.inner
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of contexts built so far.
    pub fn created(&self) -> usize {
        self.inner.created.load(Ordering::Relaxed)
    }

    /// Number of times a context was returned.
    pub fn returned(&self) -> usize {
        self.inner.released.load(Ordering::Relaxed)
    }
}

impl<C> Clone for ContextPool<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C> fmt::Debug for ContextPool<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextPool")
            .field("capacity", &self.inner.capacity)
            .field("available", &self.inner.permits.available_permits())
            .finish()
    }
}

/// A checked-out context. Dropping or releasing it returns the context to
/// its pool.
pub struct PooledContext<C: Poolable> {
    context: Option<C>,
    permit: Option<OwnedSemaphorePermit>,
    pool: Arc<PoolInner<C>>,
}

impl<C: Poolable> PooledContext<C> {
    /// Returns the context to the pool.
    pub fn release(self) {
        drop(self);
    }
}

impl<C: Poolable> Deref for PooledContext<C> {
    type Target = C;

    fn deref(&self) -> &C {
        match &self.context {
            Some(context) => context,
            None => unreachable!("context is only taken on drop"),
        }
    }
}

impl<C: Poolable> DerefMut for PooledContext<C> {
    fn deref_mut(&mut self) -> &mut C {
        match &mut self.context {
            Some(context) => context,
            None => unreachable!("context is only taken on drop"),
        }
    }
}

impl<C: Poolable> Drop for PooledContext<C> {
    fn drop(&mut self) {
        if let Some(context) = self.context.take() {
            self.pool.give_back(context);
        }
        // the permit goes last so a waiter never finds the idle list empty
        drop(self.permit.take());
    }
}

impl<C: Poolable + fmt::Debug> fmt::Debug for PooledContext<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PooledContext").field(&self.context).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct Scratch {
        entries: Vec<u32>,
        resets: usize,
    }

    impl Poolable for Scratch {
        fn reset(&mut self) {
            self.entries.clear();
            self.resets += 1;
        }
    }

    fn pool(capacity: usize) -> ContextPool<Scratch> {
        ContextPool::new(PoolConfig::default().with_capacity(capacity), Scratch::default).unwrap()
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let err = ContextPool::new(PoolConfig::default().with_capacity(0), Scratch::default)
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::OutOfRange { min: 1, .. }));
        assert_eq!(PoolConfig::default().capacity, 8);
    }

    #[tokio::test]
    async fn test_released_contexts_are_reset_and_reused() {
        let pool = pool(2);

        let mut lease = pool.acquire().await.unwrap();
        lease.entries.push(7);
        lease.release();

        let lease = pool.acquire().await.unwrap();
        assert!(lease.entries.is_empty());
        assert_eq!(lease.resets, 1);
        assert_eq!(pool.created(), 1);
        assert_eq!(pool.in_use(), 1);
    }

    #[tokio::test]
    async fn test_acquisition_waits_when_exhausted() {
        let pool = pool(2);
        let first = pool.acquire().await.unwrap();
        let _second = pool.acquire().await.unwrap();

        assert!(pool.try_acquire().is_none());
        let waiting = tokio::time::timeout(Duration::from_millis(50), pool.acquire()).await;
        assert!(waiting.is_err());

        let handle = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.acquire().await.map(|_| ()) })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!handle.is_finished());

        drop(first);
        handle.await.unwrap().unwrap();
        assert!(pool.created() <= 2);
    }

    #[tokio::test]
    async fn test_closed_pool() {
        let pool = pool(1);
        pool.close();
        assert!(matches!(pool.acquire().await, Err(ExecutionError::PoolClosed)));
    }
}
