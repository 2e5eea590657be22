//! Lazily connected provider handle.
//!
//! A session connects to the provider on first use and reuses the handle for
//! every later request. Failed connections are not remembered, so the next
//! request tries again.

use std::cell::OnceCell;
use std::fmt;

use log::{debug, info};

use crate::{GeoProvider, ProviderError};

/// Open a connection to a [`GeoProvider`].
pub trait ProviderConnector {
    /// Provider handle produced by a successful connection.
    type Provider: GeoProvider;

    /// Connect to the provider.
    ///
    /// # Errors
    /// Returns [`ProviderError::Unavailable`] when the provider cannot be
    /// reached or refuses the session.
    fn connect(&self) -> Result<Self::Provider, ProviderError>;
}

/// Single-threaded, connect-once provider session.
pub struct ProviderSession<C: ProviderConnector> {
    connector: C,
    provider: OnceCell<C::Provider>,
}

impl<C: ProviderConnector> ProviderSession<C> {
    /// Create a session that has not connected yet.
    pub const fn new(connector: C) -> Self {
        Self {
            connector,
            provider: OnceCell::new(),
        }
    }

    /// Return the provider, connecting on first use.
    ///
    /// # Errors
    /// Propagates the connector's error. The session stays unconnected.
    pub fn provider(&self) -> Result<&C::Provider, ProviderError> {
        if let Some(provider) = self.provider.get() {
            debug!("reusing provider connection");
            return Ok(provider);
        }
        info!("connecting to geospatial provider");
        let connected = self.connector.connect()?;
        Ok(self.provider.get_or_init(|| connected))
    }

    /// Report whether a connection has been established.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.provider.get().is_some()
    }

    /// The connector used by this session.
    #[must_use]
    pub const fn connector(&self) -> &C {
        &self.connector
    }
}

impl<C: ProviderConnector> fmt::Debug for ProviderSession<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSession")
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}
