//! Dynamic Table Module
//!
//! View-model transforms for queue pages whose payloads have no fixed
//! schema.
//!
//! # Components
//!
//! - [`record`]: Wire shapes (records, agent entries, pages, cells)
//! - [`directory`]: Agent id to display name lookup
//! - [`projection`]: Column discovery and row projection
//! - [`render`]: Plain-text table output

pub mod directory;
pub mod projection;
pub mod record;
pub mod render;

pub use directory::AgentDirectory;
pub use projection::{build_columns, build_rows, parse_payload, ColumnHeaderSet, DynamicRow, AGENT_NAME_COLUMN};
pub use record::{AgentEntry, CellValue, Page, RawRecord};
pub use render::TableView;
