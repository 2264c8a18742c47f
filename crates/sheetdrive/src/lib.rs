//! # sheetdrive
//!
//! Lifecycle management for resources owned by an external spreadsheet
//! automation host: one [`Session`] per host instance, name-keyed
//! [`Document`]s under the session, name-keyed [`Sheet`]s under each
//! document.
//!
//! The host itself (cell manipulation, formatting, formula evaluation,
//! file serialization) stays a black box behind the [`AutomationHost`]
//! capability trait. This crate's job is deterministic acquisition, naming,
//! and strictly ordered release of the handles the host gives out.
//!
//! ```text
//! Your code
//!     └── Session            (host connection + document registry)
//!           └── Document     (host document handle + sheet registry)
//!                 └── Sheet  (host sheet reference)
//! ```
//!
//! Disposal is explicit and flows bottom-up: transient query references,
//! then sheets, then the document, then the host handle. The host keeps its
//! own reference counts, so none of this is left to reclamation; see the
//! dispose contract on each type.
//!
//! # Example
//!
//! ```rust
//! use sheetdrive::testing::MemoryHost;
//! use sheetdrive::Session;
//!
//! fn main() -> sheetdrive::Result<()> {
//!     let mut session = Session::launch(MemoryHost::new())?;
//!
//!     let doc = session.new_document_with_single_sheet("Report")?;
//!     doc.add_sheet("Raw Data")?;
//!     doc.save_as("/exports/Report.xlsx")?;
//!
//!     session.dispose()?;
//!     Ok(())
//! }
//! ```
//!
//! Against a live host, replace [`testing::MemoryHost`] with a concrete
//! adapter such as `sheetdrive-excel-com`'s `ExcelComHost`.

pub mod document;
pub mod error;
pub mod host;
pub mod session;
pub mod sheet;
pub mod testing;

pub use document::Document;
pub use error::{Error, Result};
pub use host::{
    AutomationHost, CellRef, DocumentId, DocumentTemplate, HostError, OpenOptions, SheetId,
    SheetInfo, WindowState,
};
pub use session::Session;
pub use sheet::Sheet;
