//! Tests for the CLI commands over a working snapshot file.

#![allow(clippy::unwrap_used, clippy::panic)]

use convalida::cli::{
    cmd_check, cmd_export, cmd_hash, cmd_import, cmd_init, cmd_reset, cmd_status, cmd_toggle,
    load_or_create_session, save_session,
};
use convalida_core::{ConvalidaError, CourseCode, Session, Snapshot};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

fn codes(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// In-memory log sink for a scoped `fmt` subscriber.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` with INFO-level logs captured into the returned buffer.
fn capture_info_logs(f: impl FnOnce()) -> String {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    buffer.contents()
}

#[test]
fn missing_snapshot_falls_back_to_sample() {
    let dir = tempfile::tempdir().unwrap();
    let session = load_or_create_session(&dir.path().join("none.json")).unwrap();

    assert_eq!(session.store().origin().len(), 47);
    assert!(session.completed().is_empty());
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    cmd_init(&path, false).unwrap();
    assert!(cmd_init(&path, false).is_err());
    cmd_init(&path, true).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(
        Snapshot::from_json_bytes(&bytes).unwrap(),
        Snapshot::sample().unwrap()
    );
}

#[test]
fn toggle_and_reset_persist() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    cmd_init(&path, false).unwrap();

    cmd_toggle(&path, true, &codes(&["CAL-103", "DIBUJO-CAD"])).unwrap();
    let session = load_or_create_session(&path).unwrap();
    assert!(session.is_completed(&CourseCode::new("CAL-103")));
    assert_eq!(session.resolution().earned_credits, 23);

    cmd_toggle(&path, true, &codes(&["DIBUJO-CAD"])).unwrap();
    let session = load_or_create_session(&path).unwrap();
    assert_eq!(session.completed().len(), 1);

    cmd_reset(&path).unwrap();
    let session = load_or_create_session(&path).unwrap();
    assert!(session.completed().is_empty());
}

#[test]
fn import_applies_partial_file_and_export_writes_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let input = dir.path().join("in.json");
    let output = dir.path().join("out.json");
    std::fs::write(&input, br#"{"aprobados":["HIDR-400","DIN-EST"]}"#).unwrap();

    cmd_import(&path, &input).unwrap();
    cmd_export(&path, &output).unwrap();

    let exported = Snapshot::from_json_bytes(&std::fs::read(&output).unwrap()).unwrap();
    let completed: Vec<_> = exported.aprobados.iter().map(|c| c.as_str()).collect();
    assert_eq!(completed, vec!["DIN-EST", "HIDR-400"]);
    assert_eq!(exported.reglas.len(), 30);
}

#[test]
fn malformed_import_leaves_working_snapshot_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let input = dir.path().join("bad.json");
    cmd_init(&path, false).unwrap();
    cmd_toggle(&path, true, &codes(&["CAL-103"])).unwrap();
    let before = std::fs::read(&path).unwrap();
    std::fs::write(&input, b"{\"aprobados\": \"CAL-103\"}").unwrap();

    let result = cmd_import(&path, &input);

    assert!(matches!(result, Err(ConvalidaError::InvalidSnapshotFormat)));
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[test]
fn import_of_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = cmd_import(&dir.path().join("state.json"), &dir.path().join("nope.json"));

    assert!(matches!(result, Err(ConvalidaError::IoError(_))));
}

#[test]
fn check_and_hash_succeed_on_sample() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    cmd_check(&path, true).unwrap();
    cmd_hash(&path, true).unwrap();
}

#[test]
fn save_replaces_file_without_leftovers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    cmd_init(&path, false).unwrap();

    cmd_toggle(&path, true, &codes(&["CAL-103"])).unwrap();

    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("state.json")]);

    let saved = Snapshot::from_json_bytes(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(saved.aprobados, vec![CourseCode::new("CAL-103")]);
    assert_eq!(saved.reglas.len(), 30);
}

#[test]
fn save_into_missing_directory_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent").join("state.json");

    let result = save_session(&Session::sample().unwrap(), &path);

    assert!(matches!(result, Err(ConvalidaError::IoError(_))));
    assert!(!path.exists());
}

#[test]
fn data_issues_are_quiet_on_load_and_loud_on_import() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let input = dir.path().join("in.json");
    cmd_init(&path, false).unwrap();
    std::fs::write(&input, br#"{"aprobados":["CAL-103"]}"#).unwrap();

    let on_load = capture_info_logs(|| {
        load_or_create_session(&path).unwrap();
        cmd_status(&path, true).unwrap();
    });
    assert!(!on_load.contains("Data issue"), "{on_load}");

    let on_import = capture_info_logs(|| {
        cmd_import(&path, &input).unwrap();
    });
    assert_eq!(on_import.matches("Data issue").count(), 2, "{on_import}");
    assert!(on_import.contains("R24"), "{on_import}");
}
