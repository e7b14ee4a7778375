//! A rasterize manifest feeds the page-review scaffold.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use texaudit_toolchain::image::PNG_SIGNATURE;
use texaudit_toolchain::rasterize::list_page_images;
use texaudit_toolchain::{build_manifest, build_review, pages_from_manifest, parse_checks};

fn png(width: u32, height: u32, pad: usize) -> Vec<u8> {
    let mut data = PNG_SIGNATURE.to_vec();
    data.extend_from_slice(&13u32.to_be_bytes());
    data.extend_from_slice(b"IHDR");
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data.resize(data.len() + pad, 0);
    data
}

#[test]
fn manifest_round_trips_into_review() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().canonicalize().unwrap();
    let out = root.join("renders");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("page-1.png"), png(1275, 1650, 40_000)).unwrap();
    fs::write(out.join("page-2.png"), png(1275, 1650, 40_000)).unwrap();
    fs::write(out.join("page-3.png"), png(1650, 1275, 40_000)).unwrap();

    let rendered = list_page_images(&out).unwrap();
    let manifest = build_manifest(&root, &root.join("main.pdf"), &out, 150, &rendered, None);
    let manifest_path = root.join("manifest.json");
    fs::write(&manifest_path, serde_json::to_string_pretty(&manifest).unwrap()).unwrap();

    let pages = pages_from_manifest(&manifest_path, &root).unwrap();
    assert_eq!(pages.iter().map(|p| p.page).collect::<Vec<_>>(), vec![1, 2, 3]);

    let review = build_review(&pages, &root, &parse_checks("overflow_or_clipping"));
    assert_eq!(review.summary.total_pages, 3);
    let flags: Vec<_> = review.pages.iter().map(|p| p.auto_flags.len()).collect();
    // Only the landscape page is off the dominant size.
    assert_eq!(flags, vec![0, 0, 1]);
    assert_eq!(review.pages[1].image_relative_to_project.as_deref(), Some("renders/page-2.png"));
    assert_eq!(review.pages[0].review_template.checks.len(), 1);
    assert_eq!(pages[0].image, PathBuf::from(&manifest.pages[0].image));
}
