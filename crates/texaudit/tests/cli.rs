//! End-to-end tests driving the built `texaudit` binary.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use serde_json::Value;
use tempfile::TempDir;

fn texaudit(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_texaudit"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run texaudit")
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn json(out: &Output) -> Value {
    serde_json::from_slice(&out.stdout).expect("stdout is not JSON")
}

fn root_arg(temp: &TempDir) -> String {
    temp.path().display().to_string()
}

fn citation_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "main.tex",
        "\\documentclass{article}\n\\begin{document}\n\\cite{a} and \\citep{c}.\n\\end{document}\n",
    );
    write(temp.path(), "refs.bib", "@article{a, title={A}}\n\n\n\n@book{b, title={B}}\n");
    temp
}

#[test]
fn structure_reports_citation_issues() {
    let temp = citation_project();
    let out = texaudit(&["structure", "--project-root", &root_arg(&temp)]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let report = json(&out);
    assert_eq!(report["main_tex"], "main.tex");
    let issues = report["issues"].as_array().unwrap();
    let undefined = issues.iter().find(|i| i["type"] == "undefined_citation").unwrap();
    assert_eq!(undefined["key"], "c");
    assert_eq!(undefined["line"], 3);
    assert_eq!(undefined["severity"], "error");
    let uncited = issues
        .iter()
        .find(|i| i["type"] == "uncited_bibliography_entry")
        .unwrap();
    assert_eq!(uncited["key"], "b");
    assert_eq!(uncited["line"], 5);
}

#[test]
fn structure_output_is_stable() {
    let temp = citation_project();
    let first = texaudit(&["structure", "--project-root", &root_arg(&temp)]);
    let second = texaudit(&["structure", "--project-root", &root_arg(&temp)]);
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn structure_without_sources_exits_one_with_report() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "notes.txt", "");
    let out = texaudit(&["structure", "--project-root", &root_arg(&temp), "--pretty"]);
    assert_eq!(out.status.code(), Some(1));
    let report = json(&out);
    assert_eq!(report["issues"][0]["type"], "no_tex_files_found");
    assert!(String::from_utf8_lossy(&out.stdout).contains("\n  \""));
}

#[test]
fn invalid_root_exits_two() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing");
    let out = texaudit(&["structure", "--project-root", &missing.display().to_string()]);
    assert_eq!(out.status.code(), Some(2));
    assert!(out.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("project root is not a directory"));
    assert_eq!(stderr.trim().lines().count(), 1);
}

#[test]
fn citations_flags_generic_cite_locally() {
    let temp = citation_project();
    let out = texaudit(&["citations", "--project-root", &root_arg(&temp)]);
    assert!(out.status.success());
    let report = json(&out);
    assert!(report.get("validation_results").is_none());
    let types: Vec<&str> = report["issues"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|i| i["type"].as_str())
        .collect();
    assert!(types.contains(&"citation_style_generic_cite"));
    assert!(types.contains(&"undefined_citation"));
    assert_eq!(report["summary"]["unique_citation_keys"], 2);
}

#[test]
fn citations_remote_with_unusable_timeout_exits_two() {
    let temp = citation_project();
    let out = texaudit(&["citations", "--project-root", &root_arg(&temp), "--remote", "--timeout", "inf"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(out.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("invalid remote timeout"));
    assert!(!stderr.contains("panicked"));
}

#[test]
fn citations_missing_bib_file_exits_two() {
    let temp = citation_project();
    let out = texaudit(&["citations", "--project-root", &root_arg(&temp), "--bib-file", "nope.bib"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn citations_without_sources_exits_one() {
    let temp = TempDir::new().unwrap();
    let out = texaudit(&["citations", "--project-root", &root_arg(&temp)]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn verify_figures_reports_missing_label_and_caption() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "main.tex",
        "\\documentclass{article}\n\\begin{figure}\n\\includegraphics{x}\n\\end{figure}\n",
    );
    let out = texaudit(&["verify", "--project-root", &root_arg(&temp), "--target", "figures"]);
    assert!(out.status.success());
    let report = json(&out);
    let types: Vec<&str> = report["issues"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|i| i["type"].as_str())
        .collect();
    assert!(types.contains(&"missing_label"));
    assert!(types.contains(&"missing_caption"));
    assert_eq!(report["summary"]["entities"], 1);
}

#[test]
fn verify_section_requires_name() {
    let temp = citation_project();
    let out = texaudit(&["verify", "--project-root", &root_arg(&temp), "--target", "section"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("section name is required"));
}

#[test]
fn verify_section_not_found_lists_sections() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "main.tex",
        "\\documentclass{article}\n\\section{Introduction}\nText.\n\\section{Method}\nMore.\n",
    );
    let out = texaudit(&[
        "verify",
        "--project-root",
        &root_arg(&temp),
        "--target",
        "section",
        "--section-name",
        "Results",
    ]);
    assert!(out.status.success());
    let report = json(&out);
    assert_eq!(report["issues"][0]["type"], "section_not_found");
    assert_eq!(report["available_sections"], serde_json::json!(["Introduction", "Method"]));
}

#[test]
fn compile_log_from_text_and_stdin() {
    let log = "! Undefined control sequence.\nl.9 \\foo\nLaTeX Warning: Citation `x' undefined.\n";
    let out = texaudit(&["compile-log", "--log-text", log, "--fail-on-errors"]);
    assert_eq!(out.status.code(), Some(1));
    let analysis = json(&out);
    assert_eq!(analysis["errors"][0], "! Undefined control sequence.  [l.9]");
    assert_eq!(analysis["summary"]["warning_count"], 1);

    let mut child = Command::new(env!("CARGO_BIN_EXE_texaudit"))
        .arg("compile-log")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"Output written on main.pdf (1 page).\n")
        .unwrap();
    let out = child.wait_with_output().unwrap();
    assert!(out.status.success());
    assert_eq!(json(&out)["fatal"], false);
}

#[test]
fn toolchain_unknown_category_exits_two() {
    let out = texaudit(&["toolchain", "--tools", "latexmk:ghostscript"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn toolchain_missing_tool_reports_hint() {
    let out = texaudit(&[
        "toolchain",
        "--tools",
        "texaudit-no-such-tool:poppler",
        "--fail-on-missing",
    ]);
    assert_eq!(out.status.code(), Some(1));
    let report = json(&out);
    assert_eq!(report["all_found"], false);
    assert_eq!(report["tools"][0]["found"], false);
    assert!(report["tools"][0]["install_hint"].is_string());
}

#[test]
fn rasterize_without_pdf_or_entry_exits_two() {
    let temp = TempDir::new().unwrap();
    let out = texaudit(&["rasterize", "--project-root", &root_arg(&temp)]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Could not infer PDF"));
}

#[test]
fn rasterize_missing_pdf_exits_two() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "main.tex", "\\documentclass{article}\n");
    let out = texaudit(&["rasterize", "--project-root", &root_arg(&temp)]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("PDF not found"));
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut data = vec![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];
    data.extend_from_slice(&13u32.to_be_bytes());
    data.extend_from_slice(b"IHDR");
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data
}

#[test]
fn review_pages_from_images_dir_to_output_file() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("pages")).unwrap();
    fs::write(temp.path().join("pages/page-1.png"), png(1275, 1650)).unwrap();
    fs::write(temp.path().join("pages/page-2.png"), png(1275, 1650)).unwrap();

    let out = texaudit(&[
        "review-pages",
        "--project-root",
        &root_arg(&temp),
        "--images-dir",
        "pages",
        "--checks",
        "caption_overlap",
        "--output",
        "review/out.json",
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(out.stdout.is_empty());

    let written = fs::read_to_string(temp.path().join("review/out.json")).unwrap();
    let review: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(review["summary"]["total_pages"], 2);
    assert_eq!(review["pages"][0]["review_template"]["checks"][0]["name"], "caption_overlap");
    assert_eq!(review["summary"]["auto_flag_counts"]["possible_sparse_or_blank_page"], 2);
}

#[test]
fn review_pages_without_images_exits_one() {
    let temp = TempDir::new().unwrap();
    let out = texaudit(&["review-pages", "--project-root", &root_arg(&temp)]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn review_pages_missing_manifest_exits_two() {
    let temp = TempDir::new().unwrap();
    let out = texaudit(&["review-pages", "--project-root", &root_arg(&temp), "--manifest", "m.json"]);
    assert_eq!(out.status.code(), Some(2));
}
