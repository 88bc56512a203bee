// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Bootstrap of the remote assertion endpoint.
//!
//! The wire protocol and the mutual local-attestation handshake live in the
//! transport; this module only registers the service, binds the address,
//! and hands back a handle. A transport must refuse to serve any peer that
//! has not proven it is an enclave in the same trust domain.

use crate::service::RemoteAssertionService;
use std::sync::Arc;
use thiserror::Error;

/// Server bootstrap errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The transport failed to bind or start serving
    #[error("failed to start the remote assertion generator server on {0}")]
    Start(String, #[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Transport credentials enforcing bidirectional enclave-local attestation.
///
/// `bind` must complete the full setup: authenticate-capable listener bound
/// to `address` and serving `service`. There is no partially started state
/// to observe.
pub trait TransportCredentials: Send + Sync {
    /// Binds `address` and starts serving `service` over mutually
    /// authenticated connections.
    fn bind(
        &self,
        address: &str,
        service: Arc<dyn RemoteAssertionService>,
    ) -> Result<Box<dyn RunningServer>, Box<dyn std::error::Error + Send + Sync>>;
}

/// A started server, owned by its [`ServerHandle`].
pub trait RunningServer: Send {
    /// The address the server actually bound.
    fn local_address(&self) -> String;
    /// Stops accepting connections and shuts down.
    fn shutdown(self: Box<Self>);
}

/// Handle keeping the remote assertion endpoint alive.
pub struct ServerHandle {
    server: Box<dyn RunningServer>,
}

impl std::fmt::Debug for ServerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerHandle").finish_non_exhaustive()
    }
}

impl ServerHandle {
    /// The address the server actually bound.
    pub fn local_address(&self) -> String {
        self.server.local_address()
    }

    /// Shuts the server down.
    pub fn shutdown(self) {
        self.server.shutdown();
    }
}

/// Registers `service`, binds `address` with `credentials`, and starts
/// serving.
///
/// A bind or start failure is fatal to the caller; there are no retries
/// here.
pub fn start_server(
    address: &str,
    service: Arc<dyn RemoteAssertionService>,
    credentials: &dyn TransportCredentials,
) -> Result<ServerHandle, ServerError> {
    let server = credentials
        .bind(address, service)
        .map_err(|e| ServerError::Start(address.to_string(), e))?;
    tracing::info!(
        address = %server.local_address(),
        "remote assertion generator server started"
    );
    Ok(ServerHandle { server })
}
