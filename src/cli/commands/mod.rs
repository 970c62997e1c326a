//! Command implementations

pub mod active;
pub mod completions;
pub mod export;
pub mod import;
pub mod init;
pub mod query;
pub mod sync;

use miette::Result;

use crate::cli::GlobalOpts;
use crate::core::config::Config;
use crate::core::gateway::HttpGateway;
use crate::core::remote::RemoteClient;
use crate::core::store::MirrorStore;
use crate::core::workspace::Workspace;

/// A discovered workspace with its effective configuration
pub(crate) struct Session {
    pub workspace: Workspace,
    pub config: Config,
}

pub(crate) fn open_session(global: &GlobalOpts) -> Result<Session> {
    let workspace = match &global.workspace {
        Some(path) => Workspace::discover_from(path),
        None => Workspace::discover(),
    }
    .map_err(|e| miette::miette!("{}", e))?;
    let config = Config::load(Some(&workspace));
    Ok(Session { workspace, config })
}

/// Open the local mirror, wired to the backend when one is configured
pub(crate) fn open_store(session: &Session) -> Result<MirrorStore> {
    let remote = remote_client(&session.config)?;
    MirrorStore::open(&session.workspace, remote).map_err(|e| miette::miette!("{}", e))
}

pub(crate) fn remote_client(config: &Config) -> Result<Option<RemoteClient>> {
    match config.api_url() {
        Some(base) => RemoteClient::new(base, config.api_token.clone())
            .map(Some)
            .map_err(|e| miette::miette!("{}", e)),
        None => Ok(None),
    }
}

/// The active-query gateway, when a backend is configured
pub(crate) fn open_gateway(config: &Config) -> Option<HttpGateway> {
    let base = config.api_url()?;
    match HttpGateway::new(base, config.api_token.clone()) {
        Ok(gateway) => Some(gateway),
        Err(err) => {
            tracing::warn!(error = %err, "no se pudo inicializar el gateway de consultas");
            None
        }
    }
}
