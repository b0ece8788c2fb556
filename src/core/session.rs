use crate::domain::model::SessionToken;
use crate::domain::ports::SessionStore;
use crate::utils::error::{Result, VoteError};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::time::Duration;

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// SHA-256 十六進位字串
pub fn digest_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// 已儲存的登入狀態是否仍然有效
pub fn check_existing(token: Option<&SessionToken>, now: DateTime<Utc>, ttl: Duration) -> bool {
    let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    token.is_some_and(|t| t.is_live_at(now.timestamp_millis(), ttl_ms))
}

/// 共用密碼的登入閘門。只是嚇阻用途：沒有鎖定，也沒有嘗試次數限制。
pub struct SessionGate<S: SessionStore> {
    secret_digest: String,
    store: S,
    ttl: Duration,
}

impl<S: SessionStore> SessionGate<S> {
    pub fn new(shared_secret: &str, store: S) -> Self {
        Self {
            secret_digest: digest_password(shared_secret),
            store,
            ttl: DEFAULT_SESSION_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn verify(&self, candidate: &str) -> bool {
        digest_password(candidate) == self.secret_digest
    }

    /// 密碼正確時寫入新的登入狀態
    pub async fn login(&self, candidate: &str) -> Result<SessionToken> {
        self.login_at(candidate, Utc::now()).await
    }

    pub async fn login_at(&self, candidate: &str, now: DateTime<Utc>) -> Result<SessionToken> {
        if !self.verify(candidate) {
            tracing::warn!("🔒 Password rejected");
            return Err(VoteError::AuthError);
        }
        let token = SessionToken::issue(now);
        self.store.save(&token).await?;
        tracing::info!("🔓 Session opened");
        Ok(token)
    }

    /// 讀取儲存的狀態並檢查是否過期
    pub async fn resume(&self) -> Result<bool> {
        self.resume_at(Utc::now()).await
    }

    pub async fn resume_at(&self, now: DateTime<Utc>) -> Result<bool> {
        let token = self.store.load().await?;
        let live = check_existing(token.as_ref(), now, self.ttl);
        if token.is_some() && !live {
            tracing::info!("🔒 Stored session expired");
        }
        Ok(live)
    }

    pub async fn logout(&self) -> Result<()> {
        self.store.clear().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct MemoryStore {
        token: Arc<Mutex<Option<SessionToken>>>,
    }

    impl SessionStore for MemoryStore {
        async fn load(&self) -> Result<Option<SessionToken>> {
            Ok(*self.token.lock().unwrap())
        }

        async fn save(&self, token: &SessionToken) -> Result<()> {
            *self.token.lock().unwrap() = Some(*token);
            Ok(())
        }

        async fn clear(&self) -> Result<()> {
            *self.token.lock().unwrap() = None;
            Ok(())
        }
    }

    #[test]
    fn test_digest_is_sha256_hex() {
        let hash = digest_password("abc");
        assert_eq!(hash, "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
    }

    #[test]
    fn test_verify() {
        let gate = SessionGate::new("friends", MemoryStore::default());
        assert!(gate.verify("friends"));
        assert!(!gate.verify("Friends"));
        assert!(!gate.verify(""));
    }

    #[test]
    fn test_check_existing_expiry() {
        let now = Utc::now();
        let issued = |hours_ago: i64| SessionToken::issue(now - ChronoDuration::hours(hours_ago));

        assert!(!check_existing(Some(&issued(25)), now, DEFAULT_SESSION_TTL));
        assert!(check_existing(Some(&issued(1)), now, DEFAULT_SESSION_TTL));
        assert!(!check_existing(Some(&issued(24)), now, DEFAULT_SESSION_TTL));
        assert!(!check_existing(None, now, DEFAULT_SESSION_TTL));

        let revoked = SessionToken {
            authenticated: false,
            issued_at_epoch_ms: now.timestamp_millis(),
        };
        assert!(!check_existing(Some(&revoked), now, DEFAULT_SESSION_TTL));
    }

    #[tokio::test]
    async fn test_login_persists_token() {
        let store = MemoryStore::default();
        let gate = SessionGate::new("friends", store.clone());

        assert!(matches!(gate.login("wrong").await, Err(VoteError::AuthError)));
        assert!(store.token.lock().unwrap().is_none());

        let token = gate.login("friends").await.unwrap();
        assert!(token.authenticated);
        assert!(gate.resume().await.unwrap());

        gate.logout().await.unwrap();
        assert!(!gate.resume().await.unwrap());
    }

    #[tokio::test]
    async fn test_resume_respects_ttl() {
        let store = MemoryStore::default();
        let gate = SessionGate::new("friends", store).with_ttl(Duration::from_secs(60));
        let issued = Utc::now();
        gate.login_at("friends", issued).await.unwrap();

        assert!(gate.resume_at(issued + ChronoDuration::seconds(59)).await.unwrap());
        assert!(!gate.resume_at(issued + ChronoDuration::seconds(61)).await.unwrap());
    }
}
