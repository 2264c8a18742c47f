//! End-to-end lifecycle tests against the in-memory host.

use pretty_assertions::assert_eq;
use sheetdrive::testing::{HostCall, MemoryHost};
use sheetdrive::{Error, Session};

fn positions(journal: &[HostCall], pred: impl Fn(&HostCall) -> bool) -> Vec<usize> {
    journal
        .iter()
        .enumerate()
        .filter(|(_, call)| pred(call))
        .map(|(i, _)| i)
        .collect()
}

#[test]
fn new_document_registers_exactly_one_sheet() {
    let mut session = Session::launch(MemoryHost::new()).expect("launch");
    let doc = session
        .new_document_with_single_sheet_named("Budget", "Q1")
        .expect("create");

    assert_eq!(doc.sheet_count(), 1);
    assert!(doc.sheet("Q1").is_some());

    assert_eq!(session.document_count(), 1);
    assert!(session.document("Budget").is_some());
}

#[test]
fn one_argument_form_names_document_and_sheet_identically() {
    let mut session = Session::launch(MemoryHost::new()).expect("launch");
    session
        .new_document_with_single_sheet("Report")
        .expect("create");

    let doc = session.document("Report").expect("registered");
    assert_eq!(doc.sheet_names(), vec!["Report"]);
}

#[test]
fn seed_sheet_is_renamed_on_the_host() {
    let mut session = Session::launch(MemoryHost::new()).expect("launch");
    session
        .new_document_with_single_sheet_named("Budget", "Q1")
        .expect("create");

    let journal = session.host().journal();
    assert!(journal
        .iter()
        .any(|c| matches!(c, HostCall::RenameSheet { name, .. } if name == "Q1")));
}

#[test]
fn document_name_collision_is_checked_before_the_host_call() {
    let mut session = Session::launch(MemoryHost::new()).expect("launch");
    session
        .new_document_with_single_sheet("Report")
        .expect("create");

    let before = session.host().journal().len();
    assert!(matches!(
        session.new_document_with_single_sheet("Report"),
        Err(Error::NameCollision(name)) if name == "Report"
    ));

    // No host traffic for the rejected call.
    assert_eq!(session.host().journal().len(), before);
    assert_eq!(session.document_count(), 1);
}

#[test]
fn open_appends_xlsx_to_bare_names() {
    let host = MemoryHost::new().with_openable("/data/Report.xlsx", &["Sheet1"]);
    let mut session = Session::launch(host).expect("launch");
    session
        .open_document_read_only("/data/", "Report")
        .expect("open");

    let journal = session.host().journal();
    assert!(journal
        .iter()
        .any(|c| matches!(c, HostCall::OpenDocument { path } if path == "/data/Report.xlsx")));
    assert!(session.document("Report.xlsx").is_some());
}

#[test]
fn open_keeps_recognized_extensions_unchanged() {
    let host = MemoryHost::new().with_openable("/data/Legacy.xls", &["Sheet1"]);
    let mut session = Session::launch(host).expect("launch");
    session
        .open_document_read_only("/data/", "Legacy.xls")
        .expect("open");

    let journal = session.host().journal();
    assert!(journal
        .iter()
        .any(|c| matches!(c, HostCall::OpenDocument { path } if path == "/data/Legacy.xls")));
    assert!(session.document("Legacy.xls").is_some());
}

#[test]
fn wrap_existing_enumerates_sheets_without_renaming() {
    let host = MemoryHost::new().with_openable("/data/Metrics.xlsx", &["Alpha", "Beta"]);
    let mut session = Session::launch(host).expect("launch");
    let doc = session
        .open_document_read_only("/data/", "Metrics.xlsx")
        .expect("open");

    let mut names = doc.sheet_names();
    names.sort_unstable();
    assert_eq!(names, vec!["Alpha", "Beta"]);

    let journal = session.host().journal();
    assert!(!journal
        .iter()
        .any(|c| matches!(c, HostCall::RenameSheet { .. })));
}

#[test]
fn open_collision_on_normalized_name() {
    let host = MemoryHost::new().with_openable("/data/Report.xlsx", &["Sheet1"]);
    let mut session = Session::launch(host).expect("launch");
    session
        .open_document_read_only("/data/", "Report")
        .expect("open");

    // Same normalized key, different spelling of the request.
    assert!(matches!(
        session.open_document_read_only("/data/", "Report.xlsx"),
        Err(Error::NameCollision(_))
    ));
}

#[test]
fn add_sheet_appends_after_the_last_sheet() {
    let mut session = Session::launch(MemoryHost::new()).expect("launch");
    let doc = session
        .new_document_with_single_sheet("Report")
        .expect("create");
    doc.add_sheet("Raw Data").expect("add");

    assert_eq!(doc.sheet_count(), 2);
    let journal = session.host().journal();
    assert!(journal
        .iter()
        .any(|c| matches!(c, HostCall::AddSheet { after: 1, .. })));
}

#[test]
fn add_sheet_collision_leaves_registry_and_host_untouched() {
    let mut session = Session::launch(MemoryHost::new()).expect("launch");
    let doc = session
        .new_document_with_single_sheet("Report")
        .expect("create");
    doc.add_sheet("Q2").expect("add");

    let before = session.host().journal().len();
    let doc = session.document_mut("Report").expect("registered");
    assert!(matches!(
        doc.add_sheet("Q2"),
        Err(Error::NameCollision(name)) if name == "Q2"
    ));

    assert_eq!(doc.sheet_count(), 2);
    assert_eq!(session.host().journal().len(), before);
}

#[test]
fn used_row_extent_reports_the_populated_row() {
    let mut session = Session::launch(MemoryHost::new()).expect("launch");
    let doc = session
        .new_document_with_single_sheet("Report")
        .expect("create");
    let sheet_id = doc.sheet("Report").expect("sheet").id().expect("live");

    session.host().set_cell(sheet_id, 7, 3, "total");

    let doc = session.document("Report").expect("registered");
    let extent = doc
        .sheet("Report")
        .expect("sheet")
        .used_row_extent()
        .expect("query");
    assert_eq!(extent, Some(7));
}

#[test]
fn used_row_extent_on_empty_sheet_is_no_match() {
    let mut session = Session::launch(MemoryHost::new()).expect("launch");
    let doc = session
        .new_document_with_single_sheet("Report")
        .expect("create");

    let extent = doc
        .sheet("Report")
        .expect("sheet")
        .used_row_extent()
        .expect("query");
    assert_eq!(extent, None);
}

#[test]
fn gridline_toggle_routes_through_the_parent_document_window() {
    let mut session = Session::launch(MemoryHost::new()).expect("launch");
    let doc = session
        .new_document_with_single_sheet("Report")
        .expect("create");
    let doc_id = doc.id().expect("live");

    doc.sheet("Report")
        .expect("sheet")
        .set_display_gridlines(false)
        .expect("toggle");

    let journal = session.host().journal();
    assert!(journal.iter().any(
        |c| matches!(c, HostCall::SetGridlines { document, show: false } if *document == doc_id.0)
    ));
}

#[test]
fn document_dispose_releases_all_sheets_before_the_document() {
    let mut session = Session::launch(MemoryHost::new()).expect("launch");
    let doc = session
        .new_document_with_single_sheet("Report")
        .expect("create");
    doc.add_sheet("Q2").expect("add");
    doc.add_sheet("Q3").expect("add");

    let doc = session.document_mut("Report").expect("registered");
    doc.dispose().expect("dispose");

    let journal = session.host().journal();
    let sheet_releases = positions(&journal, |c| matches!(c, HostCall::ReleaseSheet { .. }));
    let close = positions(&journal, |c| matches!(c, HostCall::CloseDocument { .. }));
    let release = positions(&journal, |c| matches!(c, HostCall::ReleaseDocument { .. }));

    assert_eq!(sheet_releases.len(), 3);
    assert_eq!(close.len(), 1);
    assert_eq!(release.len(), 1);
    assert!(sheet_releases.iter().all(|&p| p < close[0]));
    assert!(close[0] < release[0]);
}

#[test]
fn transients_are_released_before_any_handle_release() {
    let mut session = Session::launch(MemoryHost::new()).expect("launch");
    session
        .new_document_with_single_sheet("Report")
        .expect("create");

    let doc = session.document_mut("Report").expect("registered");
    doc.dispose().expect("dispose");

    let journal = session.host().journal();
    let transients = positions(&journal, |c| matches!(c, HostCall::ReleaseTransients));
    let first_release = positions(&journal, |c| {
        matches!(
            c,
            HostCall::ReleaseSheet { .. } | HostCall::ReleaseDocument { .. }
        )
    });
    assert!(!transients.is_empty());
    assert!(transients[0] < first_release[0]);
}

#[test]
fn document_dispose_is_idempotent() {
    let mut session = Session::launch(MemoryHost::new()).expect("launch");
    session
        .new_document_with_single_sheet("Report")
        .expect("create");

    let doc = session.document_mut("Report").expect("registered");
    doc.dispose().expect("first dispose");
    doc.dispose().expect("second dispose is a no-op");

    let journal = session.host().journal();
    let closes = positions(&journal, |c| matches!(c, HostCall::CloseDocument { .. }));
    let releases = positions(&journal, |c| matches!(c, HostCall::ReleaseDocument { .. }));
    assert_eq!(closes.len(), 1);
    assert_eq!(releases.len(), 1);
}

#[test]
fn session_dispose_cascades_and_quits_a_launched_host() {
    let mut session = Session::launch(MemoryHost::new()).expect("launch");
    session
        .new_document_with_single_sheet("One")
        .expect("create");
    let doc = session
        .new_document_with_single_sheet("Two")
        .expect("create");
    doc.add_sheet("Extra").expect("add");

    session.dispose().expect("dispose");

    let host = session.host();
    assert_eq!(host.live_documents(), 0);
    assert_eq!(host.live_sheets(), 0);
    assert!(!host.is_connected());

    let journal = host.journal();
    let quit = positions(&journal, |c| matches!(c, HostCall::Quit));
    let releases = positions(&journal, |c| matches!(c, HostCall::ReleaseDocument { .. }));
    assert_eq!(quit.len(), 1);
    // Every document went before the host did.
    assert!(releases.iter().all(|&p| p < quit[0]));
}

#[test]
fn attached_sessions_never_quit_the_host() {
    let mut session = Session::attach(MemoryHost::new()).expect("attach");
    session
        .new_document_with_single_sheet("Report")
        .expect("create");
    session.dispose().expect("dispose");

    let journal = session.host().journal();
    assert!(!journal.iter().any(|c| matches!(c, HostCall::Quit)));
    assert!(journal.iter().any(|c| matches!(c, HostCall::Disconnect)));
}

#[test]
fn attach_failure_surfaces_as_host_connection_error() {
    assert!(matches!(
        Session::attach(MemoryHost::new().with_failing_attach()),
        Err(Error::HostConnection(_))
    ));
}

#[test]
fn mutating_operations_fail_after_dispose() {
    let mut session = Session::launch(MemoryHost::new()).expect("launch");
    session.dispose().expect("dispose");
    assert!(session.is_disposed());

    assert!(matches!(
        session.new_document_with_single_sheet("Report"),
        Err(Error::UseAfterDispose(_))
    ));
    assert!(matches!(
        session.open_document_read_only("/data/", "Report"),
        Err(Error::UseAfterDispose(_))
    ));
    assert!(matches!(
        session.make_visible(),
        Err(Error::UseAfterDispose(_))
    ));

    // A second dispose stays a no-op.
    session.dispose().expect("idempotent");
}

#[test]
fn save_as_restores_alert_prompts_even_when_the_save_fails() {
    let mut session = Session::launch(MemoryHost::new()).expect("launch");
    session
        .new_document_with_single_sheet("Report")
        .expect("create");

    session.host().fail_next_save();
    let doc = session.document("Report").expect("registered");
    let err = doc.save_as("/exports/Report.xlsx").expect_err("save fails");
    assert!(matches!(err, Error::Host(_)));

    assert!(session.host().alerts_enabled());

    let journal = session.host().journal();
    let off = positions(&journal, |c| {
        matches!(c, HostCall::SetDisplayAlerts { enabled: false })
    });
    let save = positions(&journal, |c| matches!(c, HostCall::SaveDocument { .. }));
    let on = positions(&journal, |c| {
        matches!(c, HostCall::SetDisplayAlerts { enabled: true })
    });
    assert!(off[0] < save[0] && save[0] < on[0]);
}

#[test]
fn save_as_round_trip_passes_the_full_path_through() {
    let mut session = Session::launch(MemoryHost::new()).expect("launch");
    let doc = session
        .new_document_with_single_sheet("Report")
        .expect("create");
    doc.save_as("/exports/final/Report.xlsm").expect("save");

    let journal = session.host().journal();
    assert!(journal.iter().any(
        |c| matches!(c, HostCall::SaveDocument { path, .. } if path == "/exports/final/Report.xlsm")
    ));
    assert!(session.host().alerts_enabled());
}

#[test]
fn disposed_sheet_rejects_queries() {
    let mut session = Session::launch(MemoryHost::new()).expect("launch");
    let doc = session
        .new_document_with_single_sheet("Report")
        .expect("create");

    let sheet = doc.sheet_mut("Report").expect("sheet");
    sheet.dispose().expect("dispose");
    assert!(matches!(
        sheet.used_row_extent(),
        Err(Error::InvalidReference(_))
    ));
    assert!(matches!(
        sheet.set_display_gridlines(true),
        Err(Error::InvalidReference(_))
    ));
}

#[test]
fn make_visible_shows_a_normal_window() {
    let session = Session::launch(MemoryHost::new()).expect("launch");
    session.make_visible().expect("show");

    let journal = session.host().journal();
    assert!(journal.iter().any(|c| matches!(
        c,
        HostCall::SetWindow {
            visible: true,
            full_screen: false
        }
    )));
}

#[test]
fn first_document_id_is_a_pass_through() {
    let mut session = Session::launch(MemoryHost::new()).expect("launch");
    let first = session
        .new_document_with_single_sheet("One")
        .expect("create")
        .id()
        .expect("live");
    session
        .new_document_with_single_sheet("Two")
        .expect("create");

    assert_eq!(session.first_document_id().expect("query"), first);
}
