//! Comparison engine for QX Web: the selection state manager, the
//! diff/highlight logic behind the comparison table, sharing links and
//! CSV export. Rendering surfaces consume this crate; they never touch
//! the storage or URL channels directly.

pub mod address;
pub mod diff;
pub mod export;
pub mod selection;
pub mod share;

pub use address::{AddressBar, MemoryAddressBar};
pub use diff::CategoryFilter;
pub use selection::{AddOutcome, SelectionManager, MAX_SELECTION};
