//! `AutomationHost` implementation mapping the capability trait onto bridge
//! protocol commands.

use host_bridge_protocol as proto;
use sheetdrive::{
    AutomationHost, CellRef, DocumentId, DocumentTemplate, HostError, OpenOptions, SheetId,
    SheetInfo, WindowState,
};

use crate::bridge::{BridgeError, ExcelComHost};

fn to_proto_template(template: DocumentTemplate) -> proto::DocumentTemplate {
    match template {
        DocumentTemplate::SingleSheet => proto::DocumentTemplate::SingleSheet,
    }
}

fn to_proto_state(state: WindowState) -> proto::WindowState {
    match state {
        WindowState::Normal => proto::WindowState::Normal,
        WindowState::Minimized => proto::WindowState::Minimized,
        WindowState::Maximized => proto::WindowState::Maximized,
    }
}

impl ExcelComHost {
    fn expect_document(
        &self,
        data: Option<proto::ResponseData>,
    ) -> Result<DocumentId, BridgeError> {
        match data {
            Some(proto::ResponseData::DocumentHandle { document }) => Ok(DocumentId(document)),
            _ => Err(BridgeError::UnexpectedResponse),
        }
    }
}

impl AutomationHost for ExcelComHost {
    fn launch(&self) -> Result<(), HostError> {
        self.spawn_bridge()?;
        self.send_command(proto::Command::Init)?;
        Ok(())
    }

    fn attach(&self) -> Result<(), HostError> {
        // Everything that can go wrong here is an attach failure: WINE or
        // the bridge missing, or the bridge unable to reach a running host.
        self.spawn_bridge()
            .map_err(|e| HostError::ConnectionFailed(e.to_string()))?;
        self.send_command(proto::Command::Attach)
            .map_err(|e| HostError::ConnectionFailed(e.to_string()))?;
        Ok(())
    }

    fn quit(&self) -> Result<(), HostError> {
        self.shutdown()?;
        Ok(())
    }

    fn disconnect(&self) -> Result<(), HostError> {
        self.teardown();
        Ok(())
    }

    fn add_document(&self, template: DocumentTemplate) -> Result<DocumentId, HostError> {
        let data = self.send_command(proto::Command::AddDocument {
            template: to_proto_template(template),
        })?;
        Ok(self.expect_document(data)?)
    }

    fn open_document(&self, path: &str, options: OpenOptions) -> Result<DocumentId, HostError> {
        let data = self.send_command(proto::Command::OpenDocument {
            path: path.to_string(),
            update_links: options.update_links,
            read_only: options.read_only,
            notify: options.notify,
        })?;
        Ok(self.expect_document(data)?)
    }

    fn first_document(&self) -> Result<DocumentId, HostError> {
        let data = self.send_command(proto::Command::FirstDocument)?;
        Ok(self.expect_document(data)?)
    }

    fn sheets(&self, document: DocumentId) -> Result<Vec<SheetInfo>, HostError> {
        let data = self.send_command(proto::Command::ListSheets {
            document: document.0,
        })?;
        match data {
            Some(proto::ResponseData::SheetList { sheets }) => Ok(sheets
                .into_iter()
                .map(|entry| SheetInfo {
                    id: SheetId(entry.sheet),
                    name: entry.name,
                })
                .collect()),
            _ => Err(BridgeError::UnexpectedResponse.into()),
        }
    }

    fn sheet_count(&self, document: DocumentId) -> Result<u32, HostError> {
        let data = self.send_command(proto::Command::SheetCount {
            document: document.0,
        })?;
        match data {
            Some(proto::ResponseData::Count { count }) => Ok(count),
            _ => Err(BridgeError::UnexpectedResponse.into()),
        }
    }

    fn add_sheet(&self, document: DocumentId, after: u32) -> Result<SheetId, HostError> {
        let data = self.send_command(proto::Command::AddSheet {
            document: document.0,
            after,
        })?;
        match data {
            Some(proto::ResponseData::SheetHandle { sheet }) => Ok(SheetId(sheet)),
            _ => Err(BridgeError::UnexpectedResponse.into()),
        }
    }

    fn rename_sheet(&self, sheet: SheetId, name: &str) -> Result<(), HostError> {
        self.send_command(proto::Command::RenameSheet {
            sheet: sheet.0,
            name: name.to_string(),
        })?;
        Ok(())
    }

    fn find_last_used_cell(
        &self,
        sheet: SheetId,
        search_backward: bool,
    ) -> Result<Option<CellRef>, HostError> {
        let data = self.send_command(proto::Command::FindLastUsedCell {
            sheet: sheet.0,
            search_backward,
        })?;
        match data {
            Some(proto::ResponseData::Cell { cell }) => Ok(cell.map(|c| CellRef {
                row: c.row,
                column: c.column,
            })),
            _ => Err(BridgeError::UnexpectedResponse.into()),
        }
    }

    fn save_document(&self, document: DocumentId, path: &str) -> Result<(), HostError> {
        self.send_command(proto::Command::SaveDocument {
            document: document.0,
            path: path.to_string(),
        })?;
        Ok(())
    }

    fn close_document(&self, document: DocumentId) -> Result<(), HostError> {
        self.send_command(proto::Command::CloseDocument {
            document: document.0,
        })?;
        Ok(())
    }

    fn release_document(&self, document: DocumentId) -> Result<(), HostError> {
        self.send_command(proto::Command::ReleaseDocument {
            document: document.0,
        })?;
        Ok(())
    }

    fn release_sheet(&self, sheet: SheetId) -> Result<(), HostError> {
        self.send_command(proto::Command::ReleaseSheet { sheet: sheet.0 })?;
        Ok(())
    }

    fn release_transients(&self) -> Result<(), HostError> {
        self.send_command(proto::Command::ReleaseTransients)?;
        Ok(())
    }

    fn set_display_alerts(&self, enabled: bool) -> Result<(), HostError> {
        self.send_command(proto::Command::SetDisplayAlerts { enabled })?;
        Ok(())
    }

    fn set_gridlines(&self, document: DocumentId, show: bool) -> Result<(), HostError> {
        self.send_command(proto::Command::SetGridlines {
            document: document.0,
            show,
        })?;
        Ok(())
    }

    fn set_window(
        &self,
        visible: bool,
        full_screen: bool,
        state: WindowState,
    ) -> Result<(), HostError> {
        self.send_command(proto::Command::SetWindow {
            visible,
            full_screen,
            state: to_proto_state(state),
        })?;
        Ok(())
    }
}
