//! RemitDesk - Remittance Back-Office Core
//!
//! View-model logic for a remittance administration console: multi-step
//! onboarding forms for agents and branches, and dynamic tables over queue
//! records whose payloads have no fixed schema.
//!
//! # Architecture
//!
//! - [`wizard`]: Step wizard engine, form state, and YAML form definitions
//! - [`forms`]: Built-in agent and agent-branch onboarding forms
//! - [`table`]: Column discovery and row projection for dynamic payloads
//! - [`source`]: Paginated agent/record sources and the queue view
//! - [`notify`]: User-facing notification channel
//! - [`session`]: Session-expiry prompt coordination
//! - [`config`]: Application settings
//!
//! # Example
//!
//! ```rust
//! use remitdesk::table::{build_columns, build_rows, AgentDirectory, AgentEntry, RawRecord};
//!
//! let directory = AgentDirectory::from_entries([AgentEntry::new("a1", "Acme Remit")]);
//! let records = vec![
//!     RawRecord::new("r1", "a1", r#"{"Beneficiary":"Sita","Amount":1200}"#),
//!     RawRecord::new("r2", "b7c1d2e3f4", "not json"),
//! ];
//!
//! let columns = build_columns(&records);
//! assert_eq!(columns.as_slice(), ["AgentName", "Beneficiary", "Amount"]);
//!
//! let rows = build_rows(&records, &directory);
//! assert_eq!(rows[0].agent_name(), "Acme Remit");
//! assert_eq!(rows[1].agent_name(), "Agent-b7c1d2e3");
//! ```

pub mod config;
pub mod error;
pub mod forms;
pub mod notify;
pub mod session;
pub mod source;
pub mod table;
pub mod wizard;

// Re-export commonly used types
pub use config::AppConfig;
pub use session::SessionCoordinator;
pub use source::{PageRequest, QueueView};
pub use table::{build_columns, build_rows, AgentDirectory, TableView};
pub use wizard::{build_wizard, Form, Navigation, StepIcon, Wizard};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "RemitDesk";
