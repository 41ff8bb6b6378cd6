//! Statement inbox — stages imported rows for confirmation and commits
//! them to the ledger.
//!
//! 1. `InboxPipeline` — the operations callers use
//! 2. `TransportSelector` — picks the local or remote adapter
//! 3. `InboxBackend` adapters — bridge call first, in-memory fallback second

pub mod adapter;
pub mod categorize;
pub mod memory;
pub mod model;
pub mod pipeline;
pub mod selector;

pub use adapter::{InboxBackend, LocalAdapter, RemoteAdapter};
pub use memory::MemoryInbox;
pub use model::{CommitResult, FlowKind, ImportFile, InboxItem, SetCategoryAck};
pub use pipeline::InboxPipeline;
pub use selector::TransportSelector;
