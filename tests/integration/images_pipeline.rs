//! Integration tests for laying out a directory of images.

use catalogpdf::config::{ImagesConfig, LayoutConfig, LayoutMode, Metadata, PageSize};
use catalogpdf::pipeline::{build_image_pdf, plan_image_pdf};
use rstest::rstest;

use crate::common::{
    images_per_page, info_string, load, page_widths, temp_dir, write_corrupt_image, write_image,
};

fn grid_config(dir: &std::path::Path, mode: LayoutMode, per_page: usize) -> ImagesConfig {
    let mut config = ImagesConfig::new(dir, "catalog.pdf");
    config.layout = LayoutConfig {
        dpi: 72,
        ..LayoutConfig::for_mode(mode, per_page)
    };
    config.quiet = true;
    config
}

#[test]
fn test_single_layout_one_page_per_image() {
    let dir = temp_dir();
    write_image(dir.path(), "a.jpg", 120, 80);
    write_image(dir.path(), "b.png", 80, 120);
    write_image(dir.path(), "c.bmp", 50, 50);

    let config = grid_config(dir.path(), LayoutMode::Single, 1);
    let report = build_image_pdf(&config).unwrap();

    assert_eq!(report.pages, 3);
    assert_eq!(report.images, 3);
    assert!(report.skipped.is_empty());
    assert_eq!(report.output, dir.path().join("catalog.pdf"));

    let doc = load(&report.output);
    assert_eq!(images_per_page(&doc), vec![1, 1, 1]);
    // A4 width in points.
    assert_eq!(page_widths(&doc), vec![595, 595, 595]);
}

#[test]
fn test_grid_of_four_paginates_ten_images() {
    let dir = temp_dir();
    for i in 0..10 {
        write_image(dir.path(), &format!("img_{i:02}.jpg"), 64, 48);
    }

    let report = build_image_pdf(&grid_config(dir.path(), LayoutMode::Grid, 4)).unwrap();

    assert_eq!(report.pages, 3);
    assert_eq!(report.images, 10);
    assert_eq!(images_per_page(&load(&report.output)), vec![4, 4, 2]);
}

#[test]
fn test_corrupt_image_is_skipped_without_leaving_a_gap() {
    let dir = temp_dir();
    for name in ["a.jpg", "b.jpg", "d.jpg", "e.jpg", "f.jpg"] {
        write_image(dir.path(), name, 40, 40);
    }
    write_corrupt_image(dir.path(), "c.jpg");

    let report = build_image_pdf(&grid_config(dir.path(), LayoutMode::Single, 1)).unwrap();

    assert_eq!(report.pages, 5);
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].path.ends_with("c.jpg"));

    let dir = temp_dir();
    for name in ["a.jpg", "b.jpg", "d.jpg", "e.jpg"] {
        write_image(dir.path(), name, 40, 40);
    }
    write_corrupt_image(dir.path(), "c.jpg");

    let report = build_image_pdf(&grid_config(dir.path(), LayoutMode::Grid, 2)).unwrap();
    assert_eq!(images_per_page(&load(&report.output)), vec![2, 2]);
}

#[rstest]
#[case(1, &[1, 1, 1, 1, 1])]
#[case(2, &[2, 2, 1])]
#[case(6, &[5])]
fn test_catalog_layout_page_counts(#[case] per_page: usize, #[case] expected: &[usize]) {
    let dir = temp_dir();
    for i in 0..5 {
        write_image(dir.path(), &format!("product-{i}.png"), 30, 60);
    }

    let report = build_image_pdf(&grid_config(dir.path(), LayoutMode::Catalog, per_page)).unwrap();
    assert_eq!(images_per_page(&load(&report.output)), expected);
}

#[test]
fn test_letter_pages_and_metadata() {
    let dir = temp_dir();
    write_image(dir.path(), "a.jpg", 10, 10);

    let mut config = grid_config(dir.path(), LayoutMode::Single, 1);
    config.layout.page_size = PageSize::Letter;
    config.metadata = Metadata::new(Some("Spring Line".to_string()), Some("Studio".to_string()));

    let report = build_image_pdf(&config).unwrap();
    let doc = load(&report.output);

    assert_eq!(page_widths(&doc), vec![612]);
    assert_eq!(info_string(&doc, b"Title").as_deref(), Some("Spring Line"));
    assert_eq!(info_string(&doc, b"Author").as_deref(), Some("Studio"));
    assert_eq!(info_string(&doc, b"Creator").as_deref(), Some("img2pdf"));
}

#[test]
fn test_non_image_files_are_ignored() {
    let dir = temp_dir();
    write_image(dir.path(), "a.JPG", 10, 10);
    std::fs::write(dir.path().join("notes.txt"), "not an image").unwrap();
    std::fs::create_dir(dir.path().join("nested")).unwrap();
    write_image(&dir.path().join("nested"), "deep.jpg", 10, 10);

    let report = build_image_pdf(&grid_config(dir.path(), LayoutMode::Single, 1)).unwrap();
    assert_eq!(report.pages, 1);
}

#[test]
fn test_dry_run_plan_writes_nothing() {
    let dir = temp_dir();
    for i in 0..7 {
        write_image(dir.path(), &format!("{i}.png"), 8, 8);
    }

    let plan = plan_image_pdf(&grid_config(dir.path(), LayoutMode::Grid, 3)).unwrap();

    assert_eq!(plan.images.len(), 7);
    assert_eq!(plan.pages, vec![3, 3, 1]);
    assert!(!plan.output.exists());
}

#[test]
fn test_rerun_replaces_existing_output() {
    let dir = temp_dir();
    write_image(dir.path(), "a.jpg", 10, 10);
    let config = grid_config(dir.path(), LayoutMode::Single, 1);

    build_image_pdf(&config).unwrap();
    write_image(dir.path(), "b.jpg", 10, 10);
    let report = build_image_pdf(&config).unwrap();

    assert_eq!(report.pages, 2);
    assert!(!dir.path().join("catalog.pdf.tmp").exists());
}

#[test]
fn test_images_are_ordered_ignoring_case() {
    let dir = temp_dir();
    for name in ["B.jpg", "a.jpg", "c.png"] {
        write_image(dir.path(), name, 10, 10);
    }

    let plan = plan_image_pdf(&grid_config(dir.path(), LayoutMode::Grid, 4)).unwrap();
    let names: Vec<_> = plan
        .images
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.jpg", "B.jpg", "c.png"]);
}

#[cfg(unix)]
#[test]
fn test_linked_images_are_included() {
    let dir = temp_dir();
    let library = temp_dir();
    write_image(dir.path(), "a.jpg", 10, 10);
    let target = write_image(library.path(), "b.jpg", 20, 10);
    std::os::unix::fs::symlink(&target, dir.path().join("b_link.jpg")).unwrap();

    let report = build_image_pdf(&grid_config(dir.path(), LayoutMode::Single, 1)).unwrap();
    assert_eq!(report.images, 2);
    assert_eq!(report.pages, 2);
}
