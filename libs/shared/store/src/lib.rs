//! In-process relational store behind an explicitly injected handle.
//!
//! Every multi-step write sequence in the workflows runs through
//! [`Store::transaction`], which holds the exclusive lock for the whole
//! check-then-write sequence and restores the pre-transaction snapshot on
//! error. That serializes the duplicate-booking existence check with the
//! insert that follows it.

mod state;

use tokio::sync::RwLock;

pub use state::StoreState;

pub struct Store {
    state: RwLock<StoreState>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
        }
    }

    /// Consistent snapshot read under the shared lock.
    pub async fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> T {
        let guard = self.state.read().await;
        f(&guard)
    }

    /// Run `f` atomically: all writes commit on `Ok`, none on `Err`.
    pub async fn transaction<T, E>(
        &self,
        f: impl FnOnce(&mut StoreState) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut guard = self.state.write().await;
        let snapshot = guard.clone();
        match f(&mut guard) {
            Ok(value) => Ok(value),
            Err(err) => {
                *guard = snapshot;
                Err(err)
            }
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared_models::user::{User, UserRole};
    use uuid::Uuid;

    fn sample_user(phone: &str) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            phone_number: phone.to_string(),
            password_hash: "hash".to_string(),
            role: UserRole::Patient,
            is_phone_verified: true,
            is_default_password: false,
            otp: None,
            otp_expires: None,
            refresh_token: None,
            deactivated: false,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn transaction_commits_on_ok() {
        let store = Store::new();
        let user = sample_user("01800000001");
        let id = user.id;

        store
            .transaction::<_, ()>(|state| {
                state.users.insert(user.id, user.clone());
                Ok(())
            })
            .await
            .unwrap();

        let found = store.read(|state| state.users.contains_key(&id)).await;
        assert!(found);
    }

    #[tokio::test]
    async fn transaction_rolls_back_all_writes_on_err() {
        let store = Store::new();
        let user = sample_user("01800000002");
        let id = user.id;

        let result: Result<(), &str> = store
            .transaction(|state| {
                state.users.insert(user.id, user.clone());
                Err("boom")
            })
            .await;

        assert!(result.is_err());
        let found = store.read(|state| state.users.contains_key(&id)).await;
        assert!(!found);
    }
}
