//! Sheet handle — owns one host sheet reference.

use std::rc::Rc;

use crate::error::{Error, Result};
use crate::host::{AutomationHost, DocumentId, SheetId};

/// A handle to one sheet of a document.
///
/// Created only by [`crate::Document`], either during construction-time
/// enumeration or through [`crate::Document::add_sheet`]. Holds no local
/// state beyond the host reference; queries are computed against the host.
///
/// [`Sheet::dispose`] is mandatory and idempotent. It releases this sheet's
/// host reference only, never the owning document.
pub struct Sheet<H: AutomationHost> {
    host: Rc<H>,
    /// Parent document, needed to reach window-level properties.
    document: DocumentId,
    handle: Option<SheetId>,
}

impl<H: AutomationHost> Sheet<H> {
    pub(crate) fn new(host: Rc<H>, document: DocumentId, handle: SheetId) -> Self {
        Self {
            host,
            document,
            handle: Some(handle),
        }
    }

    /// Host handle of this sheet, if not yet released.
    pub fn id(&self) -> Option<SheetId> {
        self.handle
    }

    /// Toggle gridline display for this sheet.
    ///
    /// The host surfaces gridlines as a property of the window displaying the
    /// parent document, so the call is routed through the document; nothing
    /// is stored on the sheet.
    pub fn set_display_gridlines(&self, show: bool) -> Result<()> {
        self.ensure_live()?;
        self.host.set_gridlines(self.document, show)?;
        Ok(())
    }

    /// 1-based row index of the last used cell, or `None` when the sheet has
    /// no non-empty cell at all.
    ///
    /// Computed by a backward cell search (row by row, from the end), so a
    /// match is always the highest used row. An empty sheet is a distinct
    /// outcome, never row 0 or row 1.
    pub fn used_row_extent(&self) -> Result<Option<u32>> {
        let id = self.ensure_live()?;
        let found = self.host.find_last_used_cell(id, true)?;
        Ok(found.map(|cell| cell.row))
    }

    /// Release the host sheet reference. Idempotent; never disposes the
    /// owning document.
    pub fn dispose(&mut self) -> Result<()> {
        let Some(id) = self.handle.take() else {
            return Ok(());
        };
        // Transient query references (e.g. the range from the last extent
        // search) must go before the sheet itself, or the host keeps the
        // whole object graph alive.
        if let Err(e) = self.host.release_transients() {
            tracing::warn!(error = %e, "transient release failed before sheet release");
        }
        self.host.release_sheet(id)?;
        tracing::debug!(sheet = id.0, "released sheet handle");
        Ok(())
    }

    fn ensure_live(&self) -> Result<SheetId> {
        self.handle.ok_or(Error::InvalidReference("sheet"))
    }
}
