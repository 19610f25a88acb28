//! Integration tests for writing one PDF per JPEG.

use catalogpdf::CatalogError;
use catalogpdf::config::{OverwriteMode, SplitConfig};
use catalogpdf::pipeline::{plan_split, split_images};

use crate::common::{
    images_per_page, info_string, load, page_widths, temp_dir, write_corrupt_image, write_image,
};

fn quiet_config(dir: &std::path::Path) -> SplitConfig {
    SplitConfig {
        quiet: true,
        ..SplitConfig::new(dir)
    }
}

#[test]
fn test_each_jpeg_becomes_a_letter_pdf() {
    let dir = temp_dir();
    write_image(dir.path(), "B.jpg", 300, 200);
    write_image(dir.path(), "a.JPEG", 100, 400);
    write_image(dir.path(), "c.png", 50, 50);
    let out = dir.path().join("pdfs").join("letter");

    let config = SplitConfig {
        output_dir: Some(out.clone()),
        ..quiet_config(dir.path())
    };
    let report = split_images(&config).unwrap();

    let outputs: Vec<_> = report.written.iter().map(|t| t.output.clone()).collect();
    assert_eq!(outputs, vec![out.join("a.pdf"), out.join("B.pdf")]);
    assert!(report.skipped.is_empty());
    assert!(report.total_size > 0);
    assert!(!out.join("c.pdf").exists());

    for output in &outputs {
        let doc = load(output);
        assert_eq!(page_widths(&doc), vec![612]);
        assert_eq!(images_per_page(&doc), vec![1]);
        assert_eq!(info_string(&doc, b"Creator").as_deref(), Some("jpg2pdf"));
    }
}

#[test]
fn test_output_defaults_to_input_directory() {
    let dir = temp_dir();
    write_image(dir.path(), "chair.jpg", 40, 30);

    let report = split_images(&quiet_config(dir.path())).unwrap();

    assert_eq!(report.output_dir, dir.path());
    assert!(dir.path().join("chair.pdf").exists());
    assert!(!dir.path().join("chair.pdf.tmp").exists());
}

#[test]
fn test_undecodable_jpeg_is_skipped() {
    let dir = temp_dir();
    write_image(dir.path(), "a.jpg", 40, 30);
    write_corrupt_image(dir.path(), "b.jpg");

    let report = split_images(&quiet_config(dir.path())).unwrap();

    assert_eq!(report.written.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].path.ends_with("b.jpg"));
    assert!(!dir.path().join("b.pdf").exists());
}

#[test]
fn test_only_undecodable_jpegs_fail() {
    let dir = temp_dir();
    write_corrupt_image(dir.path(), "a.jpg");

    let err = split_images(&quiet_config(dir.path())).unwrap_err();
    assert!(matches!(err, CatalogError::NoValidInputs { attempted: 1 }));
}

#[test]
fn test_shared_stem_keeps_first_image() {
    let dir = temp_dir();
    write_image(dir.path(), "chair.jpeg", 40, 30);
    write_image(dir.path(), "chair.jpg", 40, 30);

    let report = split_images(&quiet_config(dir.path())).unwrap();

    assert_eq!(report.written.len(), 1);
    assert!(report.written[0].image.ends_with("chair.jpeg"));
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].path.ends_with("chair.jpg"));
}

#[test]
fn test_no_clobber_refuses_existing_pdf() {
    let dir = temp_dir();
    write_image(dir.path(), "chair.jpg", 40, 30);
    std::fs::write(dir.path().join("chair.pdf"), b"keep me").unwrap();

    let config = SplitConfig {
        overwrite_mode: OverwriteMode::NoClobber,
        ..quiet_config(dir.path())
    };
    let err = split_images(&config).unwrap_err();

    assert!(matches!(err, CatalogError::OutputExists { .. }));
    assert_eq!(std::fs::read(dir.path().join("chair.pdf")).unwrap(), b"keep me");
}

#[test]
fn test_plan_writes_nothing() {
    let dir = temp_dir();
    write_image(dir.path(), "a.jpg", 10, 10);
    write_image(dir.path(), "b.jpg", 10, 10);
    let out = dir.path().join("pdfs");

    let config = SplitConfig {
        output_dir: Some(out.clone()),
        ..quiet_config(dir.path())
    };
    let plan = plan_split(&config).unwrap();

    assert_eq!(plan.targets.len(), 2);
    assert_eq!(plan.targets[1].output, out.join("b.pdf"));
    assert!(!out.exists());
}

#[test]
fn test_directory_without_jpegs() {
    let dir = temp_dir();
    write_image(dir.path(), "only.png", 10, 10);

    let err = split_images(&quiet_config(dir.path())).unwrap_err();
    assert!(matches!(err, CatalogError::NoInputFiles { .. }));
}
