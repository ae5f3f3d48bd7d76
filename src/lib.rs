//! simio: single-process simulation of secret-shared I/O for multi-party
//! computation tests.
//!
//! A [`LocalCluster`] stands in for `world_size` real parties: feeding a
//! plaintext buffer splits it into one [`Share`] per party's
//! [`SymbolTable`], outfeeding gathers the shares back and reconstructs the
//! plaintext. Everything runs synchronously in one process, which makes the
//! cluster a convenient fixture for code that consumes per-party symbol
//! tables without standing up a real deployment.
//!
//! # Example: secret matrix round trip
//!
//! ```
//! use simio::{BufferView, LocalCluster, Result, RuntimeConfig, Visibility};
//!
//! fn main() -> Result<()> {
//!     let mut cluster = LocalCluster::new(3, &RuntimeConfig::default())?;
//!
//!     let data = [1i32, 2, 3, 4];
//!     cluster.feed("x", &BufferView::new(&data[..], &[2, 2])?, Visibility::Secret)?;
//!
//!     let out = cluster.outfeed("x")?;
//!     assert_eq!(out.as_i32(), Some(&data[..]));
//!     Ok(())
//! }
//! ```

mod buffer;
mod cluster;
mod config;
mod error;
mod scheme;
mod share;
mod symbol_table;

pub use buffer::{
    BufferView, BufferViewMut, ElemSlice, ElemSliceMut, ElementType, NdBuffer, Scalar,
};
pub use cluster::LocalCluster;
pub use config::{resolve, Protocol, ResolvedConfig, RuntimeConfig};
pub use error::{Error, Result};
pub use scheme::{embed_fixed_point, to_fixed_point, AdditiveScheme, SharingScheme};
pub use share::{Share, Visibility};
pub use symbol_table::SymbolTable;
