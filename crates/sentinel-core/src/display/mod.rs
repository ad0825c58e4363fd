//! Display formatting functions and result types.
//!
//! Domain models implement [`std::fmt::Display`] directly (see [`models`]);
//! the wrappers here add context such as creation banners, change lists and
//! empty-collection messages. Every formatter produces markdown, which the
//! CLI renders for the terminal and the MCP server returns as text.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Domain Models  │    │ Collections &   │    │   Formatted     │
//! │ (Prompt, Suite) │───▶│ Result Wrappers │───▶│    Output       │
//! │                 │    │                 │    │  (Terminal/MCP) │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`collections`]: collection wrappers (Prompts, Suites, TestResults, ...)
//! - [`results`]: operation results (CreateResult, UpdateResult)
//! - [`status`]: prompt lifecycle confirmations (OperationStatus)
//! - [`datetime`]: local timestamps and elapsed durations
//! - [`models`]: Display implementations for domain models
//!
//! # Examples
//!
//! ```rust
//! use sentinel_core::{display::CreateResult, models::TestSuite};
//! use jiff::Timestamp;
//!
//! let suite = TestSuite {
//!     id: 1,
//!     name: "smoke".to_string(),
//!     description: None,
//!     test_files: vec![],
//!     execution_history: vec![],
//!     created_at: Timestamp::now(),
//!     updated_at: Timestamp::now(),
//! };
//!
//! let output = CreateResult::new(suite).to_string();
//! assert!(output.starts_with("Created suite with ID: 1"));
//! ```

pub mod collections;
pub mod datetime;
pub mod models;
pub mod results;
pub mod status;

pub use collections::{Environments, Prompts, RunHistory, Steps, Suites, TestResults};
pub use datetime::{Elapsed, LocalDateTime};
pub use results::{CreateResult, UpdateResult};
pub use status::OperationStatus;
