//! Integration tests for error handling and edge cases.

use catalogpdf::CatalogError;
use catalogpdf::config::{
    ImagesConfig, LayoutConfig, LayoutMode, MergeConfig, MergeEngine, OverwriteMode,
};
use catalogpdf::pipeline::{build_catalog, build_image_pdf, plan_catalog, plan_image_pdf};

use crate::common::{temp_dir, write_corrupt_image, write_image, write_pdf};

#[test]
fn test_missing_input_directory() {
    let dir = temp_dir();
    let missing = dir.path().join("nope");

    let err = build_image_pdf(&ImagesConfig::new(&missing, "out.pdf")).unwrap_err();
    assert!(matches!(err, CatalogError::InputDirNotFound { .. }));
    assert_eq!(err.exit_code(), 2);

    let err = build_catalog(&MergeConfig::new(&missing, "out.pdf")).unwrap_err();
    assert!(matches!(err, CatalogError::InputDirNotFound { .. }));
}

#[test]
fn test_input_path_is_a_file() {
    let dir = temp_dir();
    let file = write_image(dir.path(), "a.jpg", 4, 4);

    let err = build_image_pdf(&ImagesConfig::new(&file, "out.pdf")).unwrap_err();
    assert!(matches!(err, CatalogError::NotADirectory { .. }));
}

#[test]
fn test_empty_directory() {
    let dir = temp_dir();
    std::fs::write(dir.path().join("notes.txt"), "nothing here").unwrap();

    let err = build_image_pdf(&ImagesConfig::new(dir.path(), "out.pdf")).unwrap_err();
    assert!(matches!(err, CatalogError::NoInputFiles { .. }));

    let err = build_catalog(&MergeConfig::new(dir.path(), "out.pdf")).unwrap_err();
    assert!(matches!(err, CatalogError::NoInputFiles { .. }));
    assert!(!dir.path().join("out.pdf").exists());
}

#[test]
fn test_only_previous_output_counts_as_empty() {
    let dir = temp_dir();
    write_pdf(dir.path(), "catalog.pdf", &[612]);

    let err = build_catalog(&MergeConfig::new(dir.path(), "catalog.pdf")).unwrap_err();
    assert!(matches!(err, CatalogError::NoInputFiles { .. }));
}

#[test]
fn test_all_images_corrupt() {
    let dir = temp_dir();
    write_corrupt_image(dir.path(), "a.jpg");
    write_corrupt_image(dir.path(), "b.png");

    let err = build_image_pdf(&ImagesConfig::new(dir.path(), "out.pdf")).unwrap_err();
    assert!(matches!(err, CatalogError::NoValidInputs { attempted: 2 }));
    assert!(!dir.path().join("out.pdf").exists());
    assert!(!dir.path().join("out.pdf.tmp").exists());
}

#[test]
fn test_all_catalog_inputs_unreadable() {
    let dir = temp_dir();
    std::fs::write(dir.path().join("a.pdf"), b"not a pdf").unwrap();
    write_corrupt_image(dir.path(), "b.jpg");

    for engine in [MergeEngine::Concat, MergeEngine::Rebuild] {
        let mut config = MergeConfig::new(dir.path(), "out.pdf");
        config.engine = engine;
        let err = build_catalog(&config).unwrap_err();
        assert!(matches!(err, CatalogError::NoValidInputs { .. }), "{engine:?}");
    }
}

#[test]
fn test_no_clobber_refuses_existing_output() {
    let dir = temp_dir();
    write_image(dir.path(), "a.jpg", 4, 4);
    std::fs::write(dir.path().join("out.pdf"), b"keep me").unwrap();

    let mut config = ImagesConfig::new(dir.path(), "out.pdf");
    config.overwrite_mode = OverwriteMode::NoClobber;

    let err = build_image_pdf(&config).unwrap_err();
    assert!(matches!(err, CatalogError::OutputExists { .. }));
    assert_eq!(err.exit_code(), 4);
    assert_eq!(std::fs::read(dir.path().join("out.pdf")).unwrap(), b"keep me");

    assert!(matches!(
        plan_image_pdf(&config),
        Err(CatalogError::OutputExists { .. })
    ));
}

#[test]
fn test_no_clobber_on_catalog_output() {
    let dir = temp_dir();
    write_pdf(dir.path(), "page.pdf", &[612]);
    write_pdf(dir.path(), "catalog.pdf", &[999]);

    let mut config = MergeConfig::new(dir.path(), "catalog.pdf");
    config.overwrite_mode = OverwriteMode::NoClobber;

    assert!(matches!(
        plan_catalog(&config),
        Err(CatalogError::OutputExists { .. })
    ));
}

#[test]
fn test_output_directory_missing() {
    let dir = temp_dir();
    write_image(dir.path(), "a.jpg", 4, 4);

    let config = ImagesConfig::new(dir.path(), "missing/sub/out.pdf");
    let err = build_image_pdf(&config).unwrap_err();
    assert!(matches!(err, CatalogError::OutputDirMissing { .. }));
}

#[test]
fn test_invalid_layout_is_rejected_before_io() {
    let dir = temp_dir();
    let missing = dir.path().join("nope");

    let mut config = ImagesConfig::new(&missing, "out.pdf");
    config.layout = LayoutConfig {
        images_per_page: 0,
        ..LayoutConfig::for_mode(LayoutMode::Grid, 4)
    };

    // Configuration errors win over the missing directory.
    let err = build_image_pdf(&config).unwrap_err();
    assert!(matches!(err, CatalogError::InvalidConfig { .. }));
}

#[test]
fn test_invalid_pattern() {
    let dir = temp_dir();
    write_pdf(dir.path(), "page.pdf", &[612]);

    let mut config = MergeConfig::new(dir.path(), "catalog.pdf");
    config.patterns.cover = vec!["cover[".to_string()];

    let err = build_catalog(&config).unwrap_err();
    assert!(matches!(err, CatalogError::InvalidPattern { .. }));
}
