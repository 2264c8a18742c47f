//! Excel COM automation host adapter for sheetdrive, via a WINE bridge.
//!
//! This crate spawns a Windows `.exe` under WINE that drives Excel through
//! COM, communicating over JSON-over-stdio, and exposes the result as a
//! [`sheetdrive::AutomationHost`].
//!
//! # Architecture
//!
//! ```text
//! Your Rust code (native Linux)
//!     └── sheetdrive::Session<ExcelComHost>
//!           └── ExcelComHost (this crate)
//!                 └── spawns: wine excel-com-bridge.exe
//!                       └── COM: Excel.Application
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use sheetdrive::Session;
//! use sheetdrive_excel_com::{BridgeConfig, ExcelComHost};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = Session::launch(ExcelComHost::new(BridgeConfig::default()))?;
//!     let doc = session.new_document_with_single_sheet("Report")?;
//!     doc.save_as(&sheetdrive_excel_com::linux_to_wine_path(
//!         std::path::Path::new("/tmp/Report.xlsx"),
//!     ))?;
//!     session.dispose()?;
//!     Ok(())
//! }
//! ```

mod bridge;
mod host_impl;

pub use bridge::{linux_to_wine_path, BridgeConfig, BridgeError, ExcelComHost};
