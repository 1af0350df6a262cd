//! Pixel classification regression test
//!
//! - Part 1: a grid of square provinces has a known interior/border split
//! - Part 2: classifying row bands separately and merging matches a full pass
//! - Part 3: orphan pixels on the two-block map

use provmap_core::{
    ClassificationReport, Color, Pixel, PixelClass, PixelSink, ProvinceDefinitions, classify,
    classify_image, classify_rows, is_border_pixel,
};
use provmap_test::RegParams;
use provmap_test::fixtures::{BACKGROUND, grid_definitions, grid_image, two_block_definitions};

/// Accepts every pixel and counts by class
#[derive(Default)]
struct Counter {
    interior: usize,
    border: usize,
}

impl PixelSink for Counter {
    fn accept(&mut self, _pixel: Pixel, _color: Color, class: PixelClass) -> bool {
        match class {
            PixelClass::Interior => self.interior += 1,
            PixelClass::Border => self.border += 1,
        }
        true
    }
}

#[test]
fn classify_grid_reg() {
    let mut rp = RegParams::new("classify_grid");
    let image = grid_image(4, 4, 10);

    // each 10x10 cell: 8x8 interior, 36-pixel ring of border
    let mut counter = Counter::default();
    let report = classify_image(&image, &mut counter);
    rp.compare_values(1024.0, report.interior as f64, 0.0);
    rp.compare_values(576.0, report.border as f64, 0.0);
    rp.compare_values(1600.0, report.total() as f64, 0.0);
    rp.compare_values(1024.0, counter.interior as f64, 0.0);
    rp.compare_bool(true, report.is_clean());

    // the lazy iterator agrees with the row pass
    let lazy_border = classify(&image)
        .filter(|(_, class, _)| *class == PixelClass::Border)
        .count();
    rp.compare_values(576.0, lazy_border as f64, 0.0);
    rp.compare_bool(true, is_border_pixel(&image, 0, 5));
    rp.compare_bool(true, is_border_pixel(&image, 9, 5));
    rp.compare_bool(false, is_border_pixel(&image, 5, 5));

    // registered into definitions, every province gets one cell
    let (mut defs, _) = ProvinceDefinitions::load_definitions(&grid_definitions(4, 4)).unwrap();
    let registered = defs.register_image(&image);
    rp.compare_bool(true, registered == report);
    for province in &defs {
        rp.compare_values(64.0, province.interior_pixels().len() as f64, 0.0);
        rp.compare_values(36.0, province.border_pixels().len() as f64, 0.0);
    }

    // registering again replaces rather than accumulates
    defs.register_image(&image);
    rp.compare_values(100.0, defs.province(7).unwrap().pixel_count() as f64, 0.0);

    assert!(rp.cleanup());
}

#[test]
fn classify_bands_reg() {
    let mut rp = RegParams::new("classify_bands");
    let image = grid_image(5, 3, 7);

    let full = classify_image(&image, &mut Counter::default());
    let mut merged = ClassificationReport::default();
    for band in [0..6, 6..11, 11..21, 21..100] {
        merged.merge(classify_rows(&image, band, &mut Counter::default()));
    }
    rp.compare_bool(true, merged == full);
    rp.compare_values((35 * 21) as f64, merged.total() as f64, 0.0);

    assert!(rp.cleanup());
}

#[test]
fn classify_orphans_reg() {
    let mut rp = RegParams::new("classify_orphans");
    let image = provmap_test::load_test_image("two_block.bmp").expect("two_block.bmp");
    rp.compare_values(4.0, image.width() as f64, 0.0);

    let (mut defs, _) = ProvinceDefinitions::load_definitions(two_block_definitions()).unwrap();
    let report = defs.register_image(&image);

    // a 4x4 map is all border
    rp.compare_values(0.0, report.interior as f64, 0.0);
    rp.compare_values(8.0, report.border as f64, 0.0);
    rp.compare_values(8.0, report.orphan as f64, 0.0);
    rp.compare_values(8.0, report.orphan_colors[&BACKGROUND] as f64, 0.0);
    rp.compare_values(8.0, defs.unmapped_pixels().len() as f64, 0.0);
    rp.compare_bool(true, defs.unmapped_pixels().contains(&Pixel::new(3, 0)));
    rp.compare_bool(
        true,
        matches!(
            report.check_orphans(),
            Err(provmap_core::Error::OrphanPixels { count: 8, colors: 1 })
        ),
    );

    let red = defs.province(1).unwrap();
    rp.compare_values(4.0, red.border_pixels().len() as f64, 0.0);
    rp.compare_bool(true, red.pixels().all(|p| p.x < 2 && p.y < 2));

    assert!(rp.cleanup());
}
