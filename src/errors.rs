use std::{io, net::SocketAddr};

use metrics_exporter_prometheus::BuildError;
use thiserror::Error;

use crate::config::ConfigError;

/// Startup and serve-loop failures. Request handling itself cannot fail.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to bind listener on {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("failed to install prometheus recorder")]
    Metrics(#[from] BuildError),
    #[error("server error")]
    Io(#[from] io::Error),
}
