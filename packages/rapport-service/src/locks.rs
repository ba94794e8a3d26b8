//! In-process critical section per (event, participant).

use std::{
	collections::HashMap,
	sync::{Arc, Mutex},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

type Key = (Uuid, Uuid);

#[derive(Default)]
pub struct ParticipantLocks {
	slots: Mutex<HashMap<Key, Arc<AsyncMutex<()>>>>,
}
impl ParticipantLocks {
	/// Waits until no other run holds this participant. Runs for different participants do
	/// not contend.
	pub async fn acquire(&self, event_id: Uuid, user_id: Uuid) -> OwnedMutexGuard<()> {
		let slot = {
			let mut slots = self.slots.lock().unwrap_or_else(|err| err.into_inner());

			// Slots nobody holds or waits on can go.
			slots.retain(|_, slot| Arc::strong_count(slot) > 1);

			slots.entry((event_id, user_id)).or_default().clone()
		};

		slot.lock_owned().await
	}

	pub fn len(&self) -> usize {
		self.slots.lock().unwrap_or_else(|err| err.into_inner()).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

#[cfg(test)]
mod tests {
	use std::{
		sync::atomic::{AtomicUsize, Ordering},
		time::Duration,
	};

	use super::*;

	#[tokio::test]
	async fn same_participant_runs_do_not_overlap() {
		let locks = Arc::new(ParticipantLocks::default());
		let active = Arc::new(AtomicUsize::new(0));
		let peak = Arc::new(AtomicUsize::new(0));
		let (event, user) = (Uuid::from_u128(1), Uuid::from_u128(2));
		let mut handles = Vec::new();

		for _ in 0..4 {
			let (locks, active, peak) = (locks.clone(), active.clone(), peak.clone());

			handles.push(tokio::spawn(async move {
				let _guard = locks.acquire(event, user).await;
				let now = active.fetch_add(1, Ordering::SeqCst) + 1;

				peak.fetch_max(now, Ordering::SeqCst);
				tokio::time::sleep(Duration::from_millis(5)).await;
				active.fetch_sub(1, Ordering::SeqCst);
			}));
		}
		for handle in handles {
			handle.await.expect("task panicked");
		}

		assert_eq!(peak.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn different_participants_are_independent() {
		let locks = ParticipantLocks::default();
		let event = Uuid::from_u128(1);
		let _first = locks.acquire(event, Uuid::from_u128(2)).await;
		let second = tokio::time::timeout(
			Duration::from_millis(100),
			locks.acquire(event, Uuid::from_u128(3)),
		)
		.await;

		assert!(second.is_ok());
	}

	#[tokio::test]
	async fn released_slots_are_pruned() {
		let locks = ParticipantLocks::default();

		for id in 0..5 {
			let _guard = locks.acquire(Uuid::nil(), Uuid::from_u128(id)).await;
		}

		let _guard = locks.acquire(Uuid::nil(), Uuid::from_u128(99)).await;

		assert_eq!(locks.len(), 1);
	}
}
