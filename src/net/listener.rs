//! TCP listener binding.

use tokio::net::TcpListener;

use crate::config::ListenerConfig;
use crate::error::ProxyError;

/// Bind to the configured address.
pub async fn bind(config: &ListenerConfig) -> Result<TcpListener, ProxyError> {
    let listen_error = |source: std::io::Error| ProxyError::Listen {
        address: config.bind_address.clone(),
        source,
    };

    let addr = config
        .socket_addr()
        .map_err(|e| listen_error(std::io::Error::new(std::io::ErrorKind::InvalidInput, e)))?;

    let listener = TcpListener::bind(addr).await.map_err(listen_error)?;
    let local_addr = listener.local_addr().map_err(listen_error)?;

    tracing::info!(address = %local_addr, "Listener bound");
    Ok(listener)
}
