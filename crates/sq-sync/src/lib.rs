pub mod config;
pub mod http;
pub mod queue;
pub mod remote;
pub mod sync;

pub use config::SyncConfig;
pub use http::HttpRemoteStore;
pub use queue::{DrainStats, MAX_SYNC_ATTEMPTS, SyncQueue, SyncTask};
pub use remote::{
    AuthProvider, AuthUser, MemoryRemoteStore, NoopAuthProvider, RemoteProject,
    RemoteProjectRecord, RemoteSessionEvent, RemoteStore, StaticAuthProvider,
};
pub use sync::{SyncOutcome, Synchronizer};
