//! Per-session mutation locks.
//!
//! Joining a session is "check not full, then append". Two joins racing
//! on the last seat could both pass the check. Every mutating operation
//! therefore holds its session's lock from the first check to the
//! write, which makes the sequence atomic per session while leaving
//! different sessions fully concurrent.

use std::collections::HashMap;
use std::sync::Arc;

use gamenight_domain::SessionId;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Default)]
pub(crate) struct SessionLocks {
    locks: Mutex<HashMap<SessionId, Arc<Mutex<()>>>>,
}

impl SessionLocks {
    /// Waits for exclusive access to one session.
    ///
    /// The returned guard is owned, so it does not borrow the lock table
    /// and other sessions can be locked while it is held.
    pub(crate) async fn acquire(&self, id: SessionId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(id).or_default())
        };
        lock.lock_owned().await
    }

    /// Releases `guard` and drops the session's entry if nobody else is
    /// waiting on it.
    ///
    /// Taking the guard makes this the holder's last step. The entry is
    /// kept while another task holds a clone of the lock, so a later
    /// `acquire` always joins the same queue instead of minting a second
    /// lock for the same session.
    pub(crate) async fn forget(&self, id: SessionId, guard: OwnedMutexGuard<()>) {
        let mut locks = self.locks.lock().await;
        let held = OwnedMutexGuard::mutex(&guard);
        let idle = locks
            .get(&id)
            .is_some_and(|lock| Arc::ptr_eq(lock, held) && Arc::strong_count(lock) == 2);
        if idle {
            locks.remove(&id);
        }
        drop(guard);
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::oneshot;

    use super::*;

    #[tokio::test]
    async fn test_acquire_same_session_is_exclusive() {
        let locks = Arc::new(SessionLocks::default());
        let guard = locks.acquire(SessionId(1)).await;

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire(SessionId(1)).await;
            })
        };

        // The second acquire cannot finish while we hold the first guard.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn test_acquire_different_sessions_do_not_block() {
        let locks = SessionLocks::default();
        let _one = locks.acquire(SessionId(1)).await;
        let _two = locks.acquire(SessionId(2)).await;
        assert_eq!(locks.len().await, 2);
    }

    #[tokio::test]
    async fn test_forget_without_waiters_removes_entry() {
        let locks = SessionLocks::default();
        let guard = locks.acquire(SessionId(1)).await;
        locks.forget(SessionId(1), guard).await;
        assert_eq!(locks.len().await, 0);
    }

    #[tokio::test]
    async fn test_forget_with_waiter_keeps_exclusion() {
        let locks = Arc::new(SessionLocks::default());
        let first = locks.acquire(SessionId(1)).await;

        let (acquired_tx, acquired_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel::<()>();
        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire(SessionId(1)).await;
                acquired_tx.send(()).unwrap();
                release_rx.await.unwrap();
            })
        };

        // Let the waiter queue on the lock before it is forgotten.
        tokio::time::sleep(Duration::from_millis(20)).await;
        locks.forget(SessionId(1), first).await;
        acquired_rx.await.unwrap();
        assert_eq!(locks.len().await, 1);

        // A newcomer must wait behind the waiter, not get a fresh lock.
        let blocked =
            tokio::time::timeout(Duration::from_millis(50), locks.acquire(SessionId(1))).await;
        assert!(blocked.is_err());

        release_tx.send(()).unwrap();
        waiter.await.unwrap();
        let _guard = locks.acquire(SessionId(1)).await;
    }
}
