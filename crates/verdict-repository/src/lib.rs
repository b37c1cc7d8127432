//! Decision document loaders for the verdict decision engine
//!
//! A loader turns an opaque decision key into raw JSON bytes. The engine
//! compiles those bytes once and keeps the result in a [`DecisionCache`].
//!
//! # Loaders
//!
//! - [`FilesystemLoader`]: documents below a root directory
//! - [`MemoryLoader`]: documents registered at runtime
//! - [`ClosureLoader`] / [`BlockingClosureLoader`]: host-supplied functions
//! - [`NoopLoader`]: no documents at all
//!
//! # Quick Start
//!
//! ```no_run
//! use verdict_repository::{DecisionLoader, FilesystemLoader};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let loader = FilesystemLoader::new("decisions")?.keep_in_memory(true);
//!
//!     // Resolves decisions/pricing/discount.json
//!     let document = loader.load("pricing/discount").await?;
//!     println!("{} bytes", document.len());
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod error;
pub mod file_system;
pub mod loader;
pub mod memory;
pub mod traits;

pub use cache::{CacheStats, DecisionCache};
pub use error::{RepositoryError, RepositoryResult};
pub use file_system::FilesystemLoader;
pub use loader::{BlockingClosureLoader, ClosureLoader, NoopLoader};
pub use memory::MemoryLoader;
pub use traits::{BlockingDecisionLoader, DecisionLoader};
