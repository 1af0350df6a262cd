//! Definition table regression test
//!
//! - Part 1: a Latin-1 table with a header, comments and a bad row
//! - Part 2: fatal duplicates and lookups

use provmap_core::{Color, Error, Pixel, ProvinceDefinitions};
use provmap_test::RegParams;
use provmap_test::fixtures::two_block_image;

#[test]
fn definitions_file_reg() {
    let mut rp = RegParams::new("definitions_file");
    let text = provmap_test::load_test_text("definition.csv").expect("definition.csv");
    let (mut defs, report) = ProvinceDefinitions::load_definitions(&text).unwrap();

    rp.compare_values(3.0, report.loaded as f64, 0.0);
    rp.compare_values(3.0, defs.len() as f64, 0.0);
    rp.compare_values(1.0, report.malformed.len() as f64, 0.0);
    rp.compare_bool(
        true,
        matches!(report.malformed[0], Error::MalformedRow { line: 6, .. }),
    );

    // not valid UTF-8, so the name comes back through Latin-1
    let blue = defs.province_by_color(Color::new(0, 0, 255)).unwrap();
    rp.compare_strings("Bl\u{e9}".as_bytes(), blue.name().as_bytes());
    rp.compare_values(2.0, defs.province_by_name("Bl\u{e9}").unwrap().id() as f64, 0.0);

    // the same table through the byte and file entry points
    let path = provmap_test::test_data_path("definition.csv");
    let (from_file, _) = ProvinceDefinitions::load_definitions_file(&path).unwrap();
    rp.compare_values(3.0, from_file.len() as f64, 0.0);

    let image = two_block_image(false);
    defs.register_image(&image);
    let unused: Vec<u32> = defs.provinces_without_pixels().map(|p| p.id()).collect();
    rp.compare_bool(true, unused == [4]);
    let clicked = defs.province_at(&image, Pixel::new(3, 3)).unwrap();
    rp.compare_values(2.0, clicked.id() as f64, 0.0);
    rp.compare_bool(true, defs.province_at(&image, Pixel::new(3, 0)).is_none());

    assert!(rp.cleanup());
}

#[test]
fn definitions_errors_reg() {
    let mut rp = RegParams::new("definitions_errors");

    let dup_color = "1;A;1;2;3\n2;B;1;2;3\n";
    rp.compare_bool(
        true,
        matches!(
            ProvinceDefinitions::load_definitions(dup_color),
            Err(Error::DuplicateColor { first: 1, second: 2, .. })
        ),
    );

    let dup_id = "1;A;1;2;3\n1;B;4;5;6\n";
    rp.compare_bool(
        true,
        matches!(
            ProvinceDefinitions::load_definitions(dup_id),
            Err(Error::DuplicateId { id: 1, line: 2 })
        ),
    );

    // only the first line may be a header
    let (defs, report) =
        ProvinceDefinitions::load_definitions("1;A;1;2;3\nid;name;r;g;b\n").unwrap();
    rp.compare_values(1.0, defs.len() as f64, 0.0);
    rp.compare_values(1.0, report.malformed.len() as f64, 0.0);

    let (empty, report) = ProvinceDefinitions::load_definitions("").unwrap();
    rp.compare_bool(true, empty.is_empty());
    rp.compare_bool(true, report.is_clean());

    let missing = ProvinceDefinitions::load_definitions_file("/nonexistent/definition.csv");
    rp.compare_bool(true, matches!(missing, Err(Error::Io(_))));

    assert!(rp.cleanup());
}
