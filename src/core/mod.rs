//! Core module - workspace, configuration and external collaborators

pub mod config;
pub mod export;
pub mod gateway;
pub mod remote;
pub mod store;
pub mod workspace;

pub use config::Config;
pub use export::{ExportArtifact, ExportError, ExportFormat};
pub use gateway::{ActiveQueryGateway, ActiveQuerySnapshot, GatewayError, HttpGateway};
pub use remote::{RemoteClient, RemoteError};
pub use store::{MirrorStore, RecordStore, StoreError};
pub use workspace::{Workspace, WorkspaceError};
