//! Mock report stores for testing the alert pipeline.
//!
//! This crate provides implementations of the `ReportStore` trait that need
//! no database:
//! - `MemoryStore` - keeps reports and profiles in memory
//! - `UnavailableStore` - fails every call, as an unreachable store would
//! - `DelayedStore` - wraps another store with artificial latency
//!
//! For production persistence, use the `database` crate instead.
//!
//! # Example
//!
//! ```rust
//! use mock_store::MemoryStore;
//! use outbreak_core::{GeoPoint, RecipientId, ReportStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemoryStore::new();
//!     let reporter = RecipientId::new("reporter-1")?;
//!
//!     let report = store
//!         .insert_report(&reporter, GeoPoint::new(88.36, 22.57)?, "fever")
//!         .await?;
//!     assert_eq!(store.get_report(report.id).await?, report);
//!     Ok(())
//! }
//! ```

mod delayed;
mod memory;
mod unavailable;

// Re-export core types for convenience
pub use outbreak_core::{ReportStore, StoreError};

pub use delayed::DelayedStore;
pub use memory::MemoryStore;
pub use unavailable::UnavailableStore;
