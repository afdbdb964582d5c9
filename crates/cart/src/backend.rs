//! Backend strategy for cart persistence.
//!
//! The store's mutation logic is backend-agnostic: it validates, calls one
//! of these implementations, then reloads. [`LocalCartBackend`] owns merge
//! semantics for the anonymous file-backed cart; [`RemoteCartBackend`]
//! delegates merging to the server and is a thin pass-through to the
//! gateway.

use async_trait::async_trait;

use fashionhub_core::{Cart, CartLine, LineKey};

use crate::error::Result;
use crate::gateway::CartGateway;
use crate::session::AccessToken;
use crate::storage::LocalCartStore;

/// One of the two cart persistence strategies, selected per session edge.
#[async_trait]
pub trait CartBackend: Send + Sync {
    /// Fetch the full authoritative line list.
    async fn load(&self) -> Result<Vec<CartLine>>;

    /// Add a line, merging quantities on duplicate `(productId, size)`.
    async fn add(&self, line: CartLine) -> Result<()>;

    /// Set the quantity of an existing line.
    async fn update_quantity(&self, key: &LineKey, quantity: u32) -> Result<()>;

    /// Remove one line.
    async fn remove(&self, key: &LineKey) -> Result<()>;

    /// Remove every line.
    async fn clear(&self) -> Result<()>;
}

/// File-backed cart for anonymous sessions.
#[derive(Debug, Clone)]
pub struct LocalCartBackend {
    store: LocalCartStore,
}

impl LocalCartBackend {
    #[must_use]
    pub const fn new(store: LocalCartStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CartBackend for LocalCartBackend {
    async fn load(&self) -> Result<Vec<CartLine>> {
        Ok(self.store.load()?)
    }

    async fn add(&self, line: CartLine) -> Result<()> {
        let mut cart = Cart::from_lines(self.store.load()?);
        cart.merge(line);
        self.store.save(cart.lines())?;
        Ok(())
    }

    async fn update_quantity(&self, key: &LineKey, quantity: u32) -> Result<()> {
        let mut cart = Cart::from_lines(self.store.load()?);
        if cart.set_quantity(key, quantity) {
            self.store.save(cart.lines())?;
        }
        Ok(())
    }

    async fn remove(&self, key: &LineKey) -> Result<()> {
        let mut cart = Cart::from_lines(self.store.load()?);
        if cart.remove(key) {
            self.store.save(cart.lines())?;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.store.clear()?;
        Ok(())
    }
}

/// Server-side cart for authenticated sessions.
///
/// Constructed with the session token on the login edge; a new login builds
/// a new backend.
#[derive(Debug, Clone)]
pub struct RemoteCartBackend {
    gateway: CartGateway,
    token: AccessToken,
}

impl RemoteCartBackend {
    #[must_use]
    pub const fn new(gateway: CartGateway, token: AccessToken) -> Self {
        Self { gateway, token }
    }
}

#[async_trait]
impl CartBackend for RemoteCartBackend {
    async fn load(&self) -> Result<Vec<CartLine>> {
        Ok(self.gateway.get_cart(&self.token).await?)
    }

    async fn add(&self, line: CartLine) -> Result<()> {
        self.gateway
            .add_line(
                &self.token,
                line.product_id,
                &line.size,
                line.quantity,
                &line.accessories,
            )
            .await?;
        Ok(())
    }

    async fn update_quantity(&self, key: &LineKey, quantity: u32) -> Result<()> {
        self.gateway.update_line(&self.token, key, quantity).await?;
        Ok(())
    }

    async fn remove(&self, key: &LineKey) -> Result<()> {
        self.gateway.remove_line(&self.token, key).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.gateway.clear(&self.token).await?;
        Ok(())
    }
}
