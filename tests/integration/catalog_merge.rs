//! Integration tests for catalog assembly.

use catalogpdf::catalog::EntryKind;
use catalogpdf::config::{MergeConfig, MergeEngine, Metadata, SortMode};
use catalogpdf::merge::MergeSource;
use catalogpdf::pipeline::{build_catalog, plan_catalog};
use rstest::rstest;
use std::time::{Duration, SystemTime};

use crate::common::{info_string, load, page_widths, temp_dir, write_corrupt_image, write_image, write_pdf};

const COVER: i64 = 500;
const INNER: i64 = 550;
const BACK: i64 = 700;
const IMAGE: i64 = 612;

fn config(dir: &std::path::Path, engine: MergeEngine) -> MergeConfig {
    let mut config = MergeConfig::new(dir, "catalog.pdf");
    config.engine = engine;
    config.image_layout.dpi = 72;
    config.quiet = true;
    config
}

#[rstest]
#[case(MergeEngine::Concat)]
#[case(MergeEngine::Rebuild)]
fn test_cover_inner_back_cover_order(#[case] engine: MergeEngine) {
    let dir = temp_dir();
    write_pdf(dir.path(), "Cover.pdf", &[COVER]);
    write_image(dir.path(), "01_a.jpg", 100, 60);
    write_image(dir.path(), "02_b.jpg", 60, 100);
    write_pdf(dir.path(), "back_cover.pdf", &[BACK]);

    let report = build_catalog(&config(dir.path(), engine)).unwrap();

    assert_eq!(report.pages, 4);
    assert_eq!(report.engine, engine);
    assert!(report.skipped.is_empty());
    assert_eq!(
        page_widths(&load(&report.output)),
        vec![COVER, IMAGE, IMAGE, BACK]
    );
}

#[rstest]
#[case(MergeEngine::Concat)]
#[case(MergeEngine::Rebuild)]
fn test_multi_page_inputs_keep_page_order(#[case] engine: MergeEngine) {
    let dir = temp_dir();
    write_pdf(dir.path(), "a_spread.pdf", &[300, 310, 320]);
    write_pdf(dir.path(), "b_single.pdf", &[INNER]);

    let report = build_catalog(&config(dir.path(), engine)).unwrap();
    assert_eq!(
        page_widths(&load(&report.output)),
        vec![300, 310, 320, INNER]
    );
}

#[test]
fn test_previous_output_is_excluded_on_rerun() {
    let dir = temp_dir();
    write_pdf(dir.path(), "cover.pdf", &[COVER]);
    write_pdf(dir.path(), "page.pdf", &[INNER]);
    let config = config(dir.path(), MergeEngine::Concat);

    let first = build_catalog(&config).unwrap();
    assert_eq!(first.pages, 2);

    let second = build_catalog(&config).unwrap();
    assert_eq!(second.pages, 2);
    assert_eq!(second.excluded.len(), 1);
    assert!(second.excluded[0].path.ends_with("catalog.pdf"));
}

#[test]
fn test_custom_output_name_is_excluded() {
    let dir = temp_dir();
    write_pdf(dir.path(), "page.pdf", &[INNER]);
    write_pdf(dir.path(), "lookbook.pdf", &[999]);

    let mut config = config(dir.path(), MergeEngine::Rebuild);
    config.output = "lookbook.pdf".into();

    let report = build_catalog(&config).unwrap();
    assert_eq!(page_widths(&load(&report.output)), vec![INNER]);
}

#[test]
fn test_duplicate_covers_are_ignored() {
    let dir = temp_dir();
    write_pdf(dir.path(), "cover.jpg.pdf", &[INNER]);
    write_pdf(dir.path(), "cover.pdf", &[COVER]);
    write_image(dir.path(), "COVER.jpg", 20, 20);

    let mut config = config(dir.path(), MergeEngine::Concat);
    config.patterns.cover = vec!["cover.*".to_string()];

    // Directory order is byte-wise, so the upper-case image comes first.
    let report = build_catalog(&config).unwrap();
    assert_eq!(report.ignored.len(), 2);
    assert_eq!(page_widths(&load(&report.output)), vec![IMAGE]);
}

#[test]
fn test_unreadable_pdf_is_skipped() {
    let dir = temp_dir();
    write_pdf(dir.path(), "a.pdf", &[INNER]);
    std::fs::write(dir.path().join("b.pdf"), b"%PDF-1.4\nthis is not a pdf").unwrap();
    write_corrupt_image(dir.path(), "c.jpg");

    let report = build_catalog(&config(dir.path(), MergeEngine::Concat)).unwrap();

    assert_eq!(report.pages, 1);
    assert_eq!(report.skipped.len(), 2);
}

#[test]
fn test_generated_covers() {
    let dir = temp_dir();
    write_pdf(dir.path(), "page.pdf", &[INNER]);

    let mut config = config(dir.path(), MergeEngine::Concat);
    config.generate_covers = true;

    let report = build_catalog(&config).unwrap();

    assert_eq!(report.pages, 3);
    assert!(report.merged.first().unwrap().is_generated());
    assert!(report.merged.last().unwrap().is_generated());
    assert_eq!(
        page_widths(&load(&report.output)),
        vec![IMAGE, INNER, IMAGE]
    );
}

#[test]
fn test_only_generated_pages_is_not_a_catalog() {
    let dir = temp_dir();
    write_corrupt_image(dir.path(), "a.jpg");

    let mut config = config(dir.path(), MergeEngine::Concat);
    config.generate_covers = true;

    let err = build_catalog(&config).unwrap_err();
    assert!(matches!(
        err,
        catalogpdf::CatalogError::NoValidInputs { attempted: 1 }
    ));
    assert!(!dir.path().join("catalog.pdf").exists());
}

#[test]
fn test_sort_by_date() {
    let dir = temp_dir();
    let newer = write_pdf(dir.path(), "a.pdf", &[310]);
    let older = write_pdf(dir.path(), "b.pdf", &[320]);

    let now = SystemTime::now();
    std::fs::File::options()
        .write(true)
        .open(&older)
        .unwrap()
        .set_modified(now - Duration::from_secs(3_600))
        .unwrap();
    std::fs::File::options()
        .write(true)
        .open(&newer)
        .unwrap()
        .set_modified(now)
        .unwrap();

    let mut config = config(dir.path(), MergeEngine::Concat);
    config.sort = SortMode::Date;

    let report = build_catalog(&config).unwrap();
    assert_eq!(page_widths(&load(&report.output)), vec![320, 310]);
}

#[test]
fn test_metadata_is_written() {
    let dir = temp_dir();
    write_pdf(dir.path(), "page.pdf", &[INNER]);

    let mut config = config(dir.path(), MergeEngine::Rebuild);
    config.metadata = Metadata::new(Some("Autumn Catalog".to_string()), None);

    let report = build_catalog(&config).unwrap();
    let doc = load(&report.output);

    assert_eq!(info_string(&doc, b"Title").as_deref(), Some("Autumn Catalog"));
    assert_eq!(info_string(&doc, b"Author"), None);
    assert_eq!(info_string(&doc, b"Creator").as_deref(), Some("catalog-merge"));
}

#[test]
fn test_dry_run_plan() {
    let dir = temp_dir();
    write_pdf(dir.path(), "back-cover.pdf", &[BACK]);
    write_pdf(dir.path(), "z.pdf", &[INNER]);
    write_image(dir.path(), "A.jpg", 10, 10);
    write_pdf(dir.path(), "catalog.pdf", &[999]);
    std::fs::write(dir.path().join("readme.txt"), "skip me").unwrap();

    let plan = plan_catalog(&config(dir.path(), MergeEngine::Concat)).unwrap();

    let names: Vec<_> = plan.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["A.jpg", "z.pdf", "back-cover.pdf"]);
    assert_eq!(plan.entries[2].kind, EntryKind::BackCover);
    assert!(plan.cover().is_none());
    assert_eq!(plan.excluded.len(), 1);
}

#[test]
fn test_merged_sources_are_reported_in_order() {
    let dir = temp_dir();
    let cover = write_pdf(dir.path(), "cover.pdf", &[COVER]);
    let image = write_image(dir.path(), "photo.jpg", 10, 10);

    let report = build_catalog(&config(dir.path(), MergeEngine::Concat)).unwrap();
    assert_eq!(
        report.merged,
        vec![MergeSource::Pdf(cover), MergeSource::Image(image)]
    );
}

#[test]
fn test_capitalized_prior_catalog_is_never_merged() {
    let dir = temp_dir();
    write_pdf(dir.path(), "Catalog.pdf", &[999]);
    write_pdf(dir.path(), "spring_catalog.pdf", &[998]);
    write_pdf(dir.path(), "page.pdf", &[INNER]);

    let report = build_catalog(&config(dir.path(), MergeEngine::Concat)).unwrap();

    assert_eq!(page_widths(&load(&report.output)), vec![INNER]);
    assert_eq!(report.excluded.len(), 2);
}
