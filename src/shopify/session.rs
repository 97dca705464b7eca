use super::ShopDomain;
use crate::config::SessionSeed;
use crate::error::ShopifyError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Admin API credentials for one installed shop.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub shop: ShopDomain,
    pub access_token: String,
    pub scope: Option<String>,
}

impl Session {
    /// Offline (shop-scoped) session, keyed `offline_{shop}`.
    pub fn offline(shop: ShopDomain, access_token: impl Into<String>, scope: Option<String>) -> Self {
        Self {
            id: format!("offline_{shop}"),
            shop,
            access_token: access_token.into(),
            scope,
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("shop", &self.shop)
            .field("access_token", &"[REDACTED]")
            .field("scope", &self.scope)
            .finish()
    }
}

/// Session persistence seam. Constructed once at startup and shared through
/// `AppState`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn store(&self, session: Session) -> anyhow::Result<()>;

    async fn find_by_shop(&self, shop: &ShopDomain) -> anyhow::Result<Option<Session>>;

    /// Returns how many sessions were removed.
    async fn delete_by_shop(&self, shop: &ShopDomain) -> anyhow::Result<usize>;

    /// Returns `false` when the shop has no session.
    async fn update_scope(&self, shop: &ShopDomain, scope: &str) -> anyhow::Result<bool>;

    async fn count(&self) -> anyhow::Result<usize>;
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seeds(seeds: &[SessionSeed]) -> Result<Self, ShopifyError> {
        let mut sessions = HashMap::with_capacity(seeds.len());
        for seed in seeds {
            let shop = ShopDomain::parse(&seed.shop)?;
            let session = Session::offline(shop, seed.access_token.clone(), seed.scope.clone());
            sessions.insert(session.id.clone(), session);
        }
        Ok(Self {
            sessions: RwLock::new(sessions),
        })
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn store(&self, session: Session) -> anyhow::Result<()> {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session.id.clone(), session);
        Ok(())
    }

    async fn find_by_shop(&self, shop: &ShopDomain) -> anyhow::Result<Option<Session>> {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        Ok(sessions.values().find(|s| &s.shop == shop).cloned())
    }

    async fn delete_by_shop(&self, shop: &ShopDomain) -> anyhow::Result<usize> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, s| &s.shop != shop);
        Ok(before - sessions.len())
    }

    async fn update_scope(&self, shop: &ShopDomain, scope: &str) -> anyhow::Result<bool> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let mut updated = false;
        for session in sessions.values_mut().filter(|s| &s.shop == shop) {
            session.scope = Some(scope.to_string());
            updated = true;
        }
        Ok(updated)
    }

    async fn count(&self) -> anyhow::Result<usize> {
        Ok(self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len())
    }
}
