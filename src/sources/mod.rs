//! Override source implementations.

mod env;
mod file;
mod memory;
mod override_source;
mod remote;

pub use env::{DEFAULT_PREFIX, EnvSource};
pub use file::{DEFAULT_SECTION, FileSource};
pub use memory::MemorySource;
pub use override_source::{ENV_RANK, FILE_RANK, OverrideSource, REMOTE_RANK};
pub use remote::{FlagServiceClient, RemoteSource, json_to_overrides};
