//! In-memory automation host for tests.
//!
//! [`MemoryHost`] implements [`AutomationHost`] against plain data structures
//! and records every adapter call in an ordered journal, so tests can assert
//! release ordering (sheets before document, transients before handles)
//! without a live host process.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use crate::host::{
    AutomationHost, CellRef, DocumentId, DocumentTemplate, HostError, OpenOptions, SheetId,
    SheetInfo, WindowState,
};

/// One adapter call as observed by the host double.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Launch,
    Attach,
    Quit,
    Disconnect,
    AddDocument,
    OpenDocument { path: String },
    FirstDocument,
    Sheets { document: u64 },
    SheetCount { document: u64 },
    AddSheet { document: u64, after: u32 },
    RenameSheet { sheet: u64, name: String },
    FindLastUsedCell { sheet: u64, backward: bool },
    SaveDocument { document: u64, path: String },
    CloseDocument { document: u64 },
    ReleaseDocument { document: u64 },
    ReleaseSheet { sheet: u64 },
    ReleaseTransients,
    SetDisplayAlerts { enabled: bool },
    SetGridlines { document: u64, show: bool },
    SetWindow { visible: bool, full_screen: bool },
}

#[derive(Default)]
struct DocumentState {
    /// Sheet handles in host-native order.
    sheets: Vec<u64>,
}

struct SheetState {
    name: String,
    /// Sparse grid keyed by (row, column), 1-based.
    cells: BTreeMap<(u32, u32), String>,
}

#[derive(Default)]
struct Inner {
    journal: Vec<HostCall>,
    next_id: u64,
    connected: bool,
    documents: HashMap<u64, DocumentState>,
    /// Document handles in open order, for `first_document`.
    open_order: Vec<u64>,
    sheets: HashMap<u64, SheetState>,
    /// Path → sheet names, consulted by `open_document`.
    openable: HashMap<String, Vec<String>>,
    alerts_enabled: bool,
    fail_attach: bool,
    fail_next_save: bool,
}

/// An in-memory [`AutomationHost`].
pub struct MemoryHost {
    inner: RefCell<Inner>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            inner: RefCell::new(Inner {
                alerts_enabled: true,
                next_id: 1,
                ..Inner::default()
            }),
        }
    }

    /// Make `path` openable, containing sheets with the given names.
    pub fn with_openable(self, path: &str, sheet_names: &[&str]) -> Self {
        self.inner.borrow_mut().openable.insert(
            path.to_string(),
            sheet_names.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    /// Make the next `attach` fail.
    pub fn with_failing_attach(self) -> Self {
        self.inner.borrow_mut().fail_attach = true;
        self
    }

    /// Make the next `save_document` fail after the call is journaled.
    pub fn fail_next_save(&self) {
        self.inner.borrow_mut().fail_next_save = true;
    }

    /// Put `value` into a cell of a live sheet. An empty string is treated
    /// as no content by the cell search.
    pub fn set_cell(&self, sheet: SheetId, row: u32, column: u32, value: &str) {
        let mut inner = self.inner.borrow_mut();
        let state = inner
            .sheets
            .get_mut(&sheet.0)
            .expect("set_cell on unknown sheet");
        state.cells.insert((row, column), value.to_string());
    }

    /// Snapshot of the call journal.
    pub fn journal(&self) -> Vec<HostCall> {
        self.inner.borrow().journal.clone()
    }

    /// Current alert-prompt setting.
    pub fn alerts_enabled(&self) -> bool {
        self.inner.borrow().alerts_enabled
    }

    /// Whether the host instance is still running.
    pub fn is_connected(&self) -> bool {
        self.inner.borrow().connected
    }

    /// Number of document handles the host still holds.
    pub fn live_documents(&self) -> usize {
        self.inner.borrow().documents.len()
    }

    /// Number of sheet handles the host still holds.
    pub fn live_sheets(&self) -> usize {
        self.inner.borrow().sheets.len()
    }

    fn record(&self, call: HostCall) {
        self.inner.borrow_mut().journal.push(call);
    }
}

impl Inner {
    fn fresh_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn new_document(&mut self, sheet_names: &[String]) -> u64 {
        let doc = self.fresh_id();
        let mut state = DocumentState::default();
        for name in sheet_names {
            let sheet = self.fresh_id();
            self.sheets.insert(
                sheet,
                SheetState {
                    name: name.clone(),
                    cells: BTreeMap::new(),
                },
            );
            state.sheets.push(sheet);
        }
        self.documents.insert(doc, state);
        self.open_order.push(doc);
        doc
    }
}

impl AutomationHost for MemoryHost {
    fn launch(&self) -> Result<(), HostError> {
        self.record(HostCall::Launch);
        self.inner.borrow_mut().connected = true;
        Ok(())
    }

    fn attach(&self) -> Result<(), HostError> {
        self.record(HostCall::Attach);
        let mut inner = self.inner.borrow_mut();
        if inner.fail_attach {
            return Err(HostError::ConnectionFailed(
                "no running host instance".to_string(),
            ));
        }
        inner.connected = true;
        Ok(())
    }

    fn quit(&self) -> Result<(), HostError> {
        self.record(HostCall::Quit);
        self.inner.borrow_mut().connected = false;
        Ok(())
    }

    fn disconnect(&self) -> Result<(), HostError> {
        self.record(HostCall::Disconnect);
        Ok(())
    }

    fn add_document(&self, _template: DocumentTemplate) -> Result<DocumentId, HostError> {
        self.record(HostCall::AddDocument);
        let mut inner = self.inner.borrow_mut();
        let doc = inner.new_document(&["Sheet1".to_string()]);
        Ok(DocumentId(doc))
    }

    fn open_document(&self, path: &str, _options: OpenOptions) -> Result<DocumentId, HostError> {
        self.record(HostCall::OpenDocument {
            path: path.to_string(),
        });
        let mut inner = self.inner.borrow_mut();
        let names = inner
            .openable
            .get(path)
            .cloned()
            .ok_or_else(|| HostError::Fault(format!("cannot open '{path}'")))?;
        let doc = inner.new_document(&names);
        Ok(DocumentId(doc))
    }

    fn first_document(&self) -> Result<DocumentId, HostError> {
        self.record(HostCall::FirstDocument);
        let inner = self.inner.borrow();
        inner
            .open_order
            .iter()
            .find(|id| inner.documents.contains_key(*id))
            .map(|&id| DocumentId(id))
            .ok_or_else(|| HostError::Fault("no open documents".to_string()))
    }

    fn sheets(&self, document: DocumentId) -> Result<Vec<SheetInfo>, HostError> {
        self.record(HostCall::Sheets {
            document: document.0,
        });
        let inner = self.inner.borrow();
        let state = inner
            .documents
            .get(&document.0)
            .ok_or_else(|| HostError::Fault("unknown document handle".to_string()))?;
        Ok(state
            .sheets
            .iter()
            .map(|&id| SheetInfo {
                id: SheetId(id),
                name: inner.sheets[&id].name.clone(),
            })
            .collect())
    }

    fn sheet_count(&self, document: DocumentId) -> Result<u32, HostError> {
        self.record(HostCall::SheetCount {
            document: document.0,
        });
        let inner = self.inner.borrow();
        let state = inner
            .documents
            .get(&document.0)
            .ok_or_else(|| HostError::Fault("unknown document handle".to_string()))?;
        Ok(state.sheets.len() as u32)
    }

    fn add_sheet(&self, document: DocumentId, after: u32) -> Result<SheetId, HostError> {
        self.record(HostCall::AddSheet {
            document: document.0,
            after,
        });
        let mut inner = self.inner.borrow_mut();
        if !inner.documents.contains_key(&document.0) {
            return Err(HostError::Fault("unknown document handle".to_string()));
        }
        let sheet = inner.fresh_id();
        inner.sheets.insert(
            sheet,
            SheetState {
                name: format!("Sheet{sheet}"),
                cells: BTreeMap::new(),
            },
        );
        let doc = inner.documents.get_mut(&document.0).expect("checked above");
        let position = doc.sheets.len().min(after as usize);
        doc.sheets.insert(position, sheet);
        Ok(SheetId(sheet))
    }

    fn rename_sheet(&self, sheet: SheetId, name: &str) -> Result<(), HostError> {
        self.record(HostCall::RenameSheet {
            sheet: sheet.0,
            name: name.to_string(),
        });
        let mut inner = self.inner.borrow_mut();
        let state = inner
            .sheets
            .get_mut(&sheet.0)
            .ok_or_else(|| HostError::Fault("unknown sheet handle".to_string()))?;
        state.name = name.to_string();
        Ok(())
    }

    fn find_last_used_cell(
        &self,
        sheet: SheetId,
        search_backward: bool,
    ) -> Result<Option<CellRef>, HostError> {
        self.record(HostCall::FindLastUsedCell {
            sheet: sheet.0,
            backward: search_backward,
        });
        let inner = self.inner.borrow();
        let state = inner
            .sheets
            .get(&sheet.0)
            .ok_or_else(|| HostError::Fault("unknown sheet handle".to_string()))?;
        // The grid is keyed (row, column), so plain key order is a row-by-row
        // scan; reversed, the first non-empty hit is the last used cell.
        let hit = if search_backward {
            state.cells.iter().rev().find(|(_, v)| !v.is_empty())
        } else {
            state.cells.iter().find(|(_, v)| !v.is_empty())
        };
        Ok(hit.map(|(&(row, column), _)| CellRef { row, column }))
    }

    fn save_document(&self, document: DocumentId, path: &str) -> Result<(), HostError> {
        self.record(HostCall::SaveDocument {
            document: document.0,
            path: path.to_string(),
        });
        let mut inner = self.inner.borrow_mut();
        if inner.fail_next_save {
            inner.fail_next_save = false;
            return Err(HostError::Fault("save rejected".to_string()));
        }
        Ok(())
    }

    fn close_document(&self, document: DocumentId) -> Result<(), HostError> {
        self.record(HostCall::CloseDocument {
            document: document.0,
        });
        Ok(())
    }

    fn release_document(&self, document: DocumentId) -> Result<(), HostError> {
        self.record(HostCall::ReleaseDocument {
            document: document.0,
        });
        self.inner.borrow_mut().documents.remove(&document.0);
        Ok(())
    }

    fn release_sheet(&self, sheet: SheetId) -> Result<(), HostError> {
        self.record(HostCall::ReleaseSheet { sheet: sheet.0 });
        self.inner.borrow_mut().sheets.remove(&sheet.0);
        Ok(())
    }

    fn release_transients(&self) -> Result<(), HostError> {
        self.record(HostCall::ReleaseTransients);
        Ok(())
    }

    fn set_display_alerts(&self, enabled: bool) -> Result<(), HostError> {
        self.record(HostCall::SetDisplayAlerts { enabled });
        self.inner.borrow_mut().alerts_enabled = enabled;
        Ok(())
    }

    fn set_gridlines(&self, document: DocumentId, show: bool) -> Result<(), HostError> {
        self.record(HostCall::SetGridlines {
            document: document.0,
            show,
        });
        Ok(())
    }

    fn set_window(
        &self,
        visible: bool,
        full_screen: bool,
        _state: WindowState,
    ) -> Result<(), HostError> {
        self.record(HostCall::SetWindow {
            visible,
            full_screen,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host_with_sheet() -> (MemoryHost, SheetId) {
        let host = MemoryHost::new();
        host.launch().unwrap();
        let doc = host.add_document(DocumentTemplate::SingleSheet).unwrap();
        let sheet = host.sheets(doc).unwrap()[0].id;
        (host, sheet)
    }

    #[test]
    fn empty_sheet_has_no_last_used_cell() {
        let (host, sheet) = host_with_sheet();
        assert_eq!(host.find_last_used_cell(sheet, true).unwrap(), None);
    }

    #[test]
    fn single_populated_row_is_found() {
        let (host, sheet) = host_with_sheet();
        host.set_cell(sheet, 7, 2, "x");
        let hit = host.find_last_used_cell(sheet, true).unwrap();
        assert_eq!(hit, Some(CellRef { row: 7, column: 2 }));
    }

    #[test]
    fn backward_scan_returns_highest_used_row() {
        let (host, sheet) = host_with_sheet();
        host.set_cell(sheet, 3, 1, "a");
        host.set_cell(sheet, 12, 4, "b");
        host.set_cell(sheet, 5, 9, "c");
        let hit = host.find_last_used_cell(sheet, true).unwrap();
        assert_eq!(hit, Some(CellRef { row: 12, column: 4 }));
    }

    #[test]
    fn within_a_row_the_highest_column_wins() {
        let (host, sheet) = host_with_sheet();
        host.set_cell(sheet, 12, 4, "b");
        host.set_cell(sheet, 12, 9, "c");
        let hit = host.find_last_used_cell(sheet, true).unwrap();
        assert_eq!(hit, Some(CellRef { row: 12, column: 9 }));
    }

    #[test]
    fn empty_string_content_does_not_count_as_used() {
        let (host, sheet) = host_with_sheet();
        host.set_cell(sheet, 4, 1, "x");
        host.set_cell(sheet, 20, 3, "");
        let hit = host.find_last_used_cell(sheet, true).unwrap();
        assert_eq!(hit, Some(CellRef { row: 4, column: 1 }));
    }

    #[test]
    fn forward_scan_finds_first_used_cell() {
        let (host, sheet) = host_with_sheet();
        host.set_cell(sheet, 3, 2, "a");
        host.set_cell(sheet, 9, 1, "b");
        let hit = host.find_last_used_cell(sheet, false).unwrap();
        assert_eq!(hit, Some(CellRef { row: 3, column: 2 }));
    }
}
