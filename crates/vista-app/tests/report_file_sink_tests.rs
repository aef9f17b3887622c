//! Integration tests for the directory-backed report sink.

use std::fs;

use vista_app::{FileReportSink, ReportError, ReportSink};

#[test]
fn report_file_sink_tests_writes_file_and_leaves_no_partial() {
    let dir = tempfile::tempdir().expect("temp dir");
    let sink = FileReportSink::new(dir.path().join("reports"));

    let path = sink
        .save("VISTA_Report_1.pdf", b"%PDF-1.4")
        .expect("save should succeed");

    assert_eq!(path, dir.path().join("reports").join("VISTA_Report_1.pdf"));
    assert_eq!(fs::read(&path).expect("report readable"), b"%PDF-1.4");
    let names: Vec<String> = fs::read_dir(dir.path().join("reports"))
        .expect("list reports")
        .map(|entry| {
            entry
                .expect("dir entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    assert_eq!(names, vec!["VISTA_Report_1.pdf".to_string()]);
}

#[test]
fn report_file_sink_tests_failed_save_cleans_up_partial() {
    let dir = tempfile::tempdir().expect("temp dir");
    let sink = FileReportSink::new(dir.path());
    fs::create_dir(dir.path().join("VISTA_Report_2.pdf")).expect("blocking directory");
    fs::write(dir.path().join("VISTA_Report_2.pdf").join("keep"), b"x").expect("fill dir");

    let outcome = sink.save("VISTA_Report_2.pdf", b"%PDF-1.4");

    assert!(matches!(outcome, Err(ReportError::Io(_))));
    assert!(!dir.path().join("VISTA_Report_2.pdf.partial").exists());
}

#[test]
fn report_file_sink_tests_rejects_path_traversal() {
    let dir = tempfile::tempdir().expect("temp dir");
    let sink = FileReportSink::new(dir.path());

    let outcome = sink.save("../escape.pdf", b"%PDF-1.4");
    assert!(matches!(outcome, Err(ReportError::InvalidName(_))));
}
