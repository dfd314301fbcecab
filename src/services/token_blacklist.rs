//! In-memory blacklist of revoked JWTs.
//!
//! Logout and refresh revoke the presented token. Entries live until the
//! token would have expired anyway, so the map never outgrows the set of
//! tokens that could still validate.

use dashmap::DashMap;
use log::{debug, info};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct BlacklistEntry {
    expires_at: Instant,
}

/// Shared across workers; clones point at the same map.
#[derive(Clone)]
pub struct TokenBlacklist {
    /// Token hash -> expiry; raw tokens are never stored
    tokens: Arc<DashMap<String, BlacklistEntry>>,
    last_cleanup: Arc<RwLock<Instant>>,
}

impl TokenBlacklist {
    pub fn new() -> Self {
        Self {
            tokens: Arc::new(DashMap::new()),
            last_cleanup: Arc::new(RwLock::new(Instant::now())),
        }
    }

    /// Revokes `token` until `exp` (Unix seconds). Already expired tokens are ignored.
    pub async fn blacklist_token(&self, token: &str, exp: usize) {
        let now_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as usize)
            .unwrap_or_default();

        if exp > now_secs {
            let ttl = Duration::from_secs((exp - now_secs) as u64);
            self.tokens.insert(
                Self::hash_token(token),
                BlacklistEntry {
                    expires_at: Instant::now() + ttl,
                },
            );
            debug!("Token blacklisted, will expire in {:?}", ttl);
        }

        self.maybe_cleanup().await;
    }

    pub fn is_blacklisted(&self, token: &str) -> bool {
        let token_hash = Self::hash_token(token);

        if let Some(entry) = self.tokens.get(&token_hash) {
            if entry.expires_at > Instant::now() {
                return true;
            }
            // release the shard read lock before removing
            drop(entry);
            self.tokens.remove(&token_hash);
        }

        false
    }

    fn hash_token(token: &str) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        format!("{:x}", hasher.finish())
    }

    async fn maybe_cleanup(&self) {
        let should_cleanup = {
            let last = self.last_cleanup.read().await;
            last.elapsed() >= CLEANUP_INTERVAL
        };

        if should_cleanup {
            let mut last = self.last_cleanup.write().await;
            // another task may have swept while we waited for the lock
            if last.elapsed() >= CLEANUP_INTERVAL {
                self.cleanup();
                *last = Instant::now();
            }
        }
    }

    fn cleanup(&self) {
        let now = Instant::now();
        let before_count = self.tokens.len();

        self.tokens.retain(|_, entry| entry.expires_at > now);

        let removed = before_count - self.tokens.len();
        if removed > 0 {
            info!(
                "Token blacklist cleanup: removed {} expired entries, {} remaining",
                removed,
                self.tokens.len()
            );
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Default for TokenBlacklist {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unix_now() -> usize {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as usize
    }

    #[tokio::test]
    async fn test_blacklisted_until_expiry() {
        let blacklist = TokenBlacklist::new();
        blacklist.blacklist_token("token-a", unix_now() + 3600).await;

        assert!(blacklist.is_blacklisted("token-a"));
        assert!(!blacklist.is_blacklisted("token-b"));
        assert_eq!(blacklist.len(), 1);
    }

    #[tokio::test]
    async fn test_expired_tokens_are_not_stored() {
        let blacklist = TokenBlacklist::new();
        blacklist.blacklist_token("old", unix_now().saturating_sub(10)).await;

        assert!(blacklist.is_empty());
        assert!(!blacklist.is_blacklisted("old"));
    }

    #[test]
    fn test_stale_entry_is_dropped_on_lookup() {
        let blacklist = TokenBlacklist::new();
        blacklist.tokens.insert(
            TokenBlacklist::hash_token("stale"),
            BlacklistEntry {
                expires_at: Instant::now() - Duration::from_secs(1),
            },
        );

        assert!(!blacklist.is_blacklisted("stale"));
        assert!(blacklist.is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let blacklist = TokenBlacklist::new();
        let clone = blacklist.clone();
        clone.tokens.insert(
            TokenBlacklist::hash_token("shared"),
            BlacklistEntry {
                expires_at: Instant::now() + Duration::from_secs(60),
            },
        );
        assert!(blacklist.is_blacklisted("shared"));
    }
}
