//! Mapping table regression test
//!
//! Loads definitions and province bitmaps for two small maps, links their
//! provinces through a mapping table and checks that saving and reloading
//! the table keeps every link, comment and point.

use provmap_core::{ProvinceDefinitions, Side};
use provmap_link::{LinkError, LinkMapper};
use provmap_test::{RegParams, fixtures};

fn load_two_block(swapped: bool) -> ProvinceDefinitions {
    let (mut defs, report) =
        ProvinceDefinitions::load_definitions(fixtures::two_block_definitions())
            .expect("definitions");
    assert!(report.is_clean());
    defs.register_image(&fixtures::two_block_image(swapped));
    defs
}

#[test]
fn mapping_two_block_reg() {
    let mut rp = RegParams::new("mapping_two_block");

    let source = load_two_block(false);
    let target = load_two_block(true);

    for defs in [&source, &target] {
        for province in defs.provinces() {
            rp.compare_values(4.0, province.pixel_count() as f64, 0.0);
            rp.compare_values(4.0, province.border_pixels().len() as f64, 0.0);
            rp.compare_values(0.0, province.interior_pixels().len() as f64, 0.0);
        }
        rp.compare_values(8.0, defs.unmapped_pixels().len() as f64, 0.0);
    }

    let (mapper, report) = LinkMapper::load_mappings("1=2\n", &source, &target);
    rp.compare_bool(true, report.is_clean());
    let version = mapper.active_version();
    rp.compare_values(1.0, version.link_count() as f64, 0.0);
    let link = &version.links()[0];
    rp.compare_strings(b"1 = 2", provmap_link::format_link(link).as_bytes());
    rp.compare_bool(true, link.source_provinces().iter().eq([1u32].iter()));
    rp.compare_bool(true, link.target_provinces().iter().eq([2u32].iter()));

    // Blue is unlinked on the source side, Red on the target side
    let unmapped: Vec<u32> = version
        .unmapped_provinces(Side::Source, &source)
        .map(|p| p.id())
        .collect();
    rp.compare_bool(true, unmapped == vec![2]);
    let unmapped: Vec<u32> = version
        .unmapped_provinces(Side::Target, &target)
        .map(|p| p.id())
        .collect();
    rp.compare_bool(true, unmapped == vec![1]);

    assert!(rp.cleanup());
}

#[test]
fn mapping_roundtrip_reg() {
    let mut rp = RegParams::new("mapping_roundtrip");

    let (source, _) =
        ProvinceDefinitions::load_definitions(&fixtures::grid_definitions(4, 4)).expect("source");
    let (target, _) =
        ProvinceDefinitions::load_definitions(&fixtures::grid_definitions(4, 4)).expect("target");

    let canonical = "\
[version 1.0]
1,2 = 16 # merged west
3 = 14,15
= 13
4 =
point 0,0 -> 7,0
point 3,5 -> _
[version 1.0 copy]
1 = 1
";

    // Part 1: canonical text survives load/save byte for byte
    let (mapper, report) = LinkMapper::load_mappings(canonical, &source, &target);
    rp.compare_bool(true, report.is_clean());
    rp.compare_strings(canonical.as_bytes(), mapper.save_all().as_bytes());

    // Part 2: names and spacing normalize to ids
    let loose = "# loose spacing and names\n  \"Cell 2\" ,1=16#merged west\nCell 3 = Cell 15, 14\n";
    let (mapper2, report2) = LinkMapper::load_mappings(loose, &source, &target);
    rp.compare_bool(true, report2.is_clean());
    rp.compare_strings(
        b"1,2 = 16 # merged west\n3 = 14,15\n",
        mapper2.save_mappings(0).unwrap_or_default().as_bytes(),
    );

    // Part 3: file round trip, structural equality after reload
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("mapping.txt");
    mapper.save_mappings_file(&path).expect("save");
    let (reloaded, report3) =
        LinkMapper::load_mappings_file(&path, &source, &target).expect("load");
    rp.compare_bool(true, report3.is_clean());
    rp.compare_values(2.0, reloaded.versions().len() as f64, 0.0);
    for (a, b) in mapper.versions().iter().zip(reloaded.versions()) {
        rp.compare_bool(true, a.name() == b.name());
        rp.compare_bool(true, a.links() == b.links());
        rp.compare_bool(true, a.points() == b.points());
    }

    // Part 4: golden copy of the saved table
    rp.write_data_and_check(mapper.save_all().as_bytes(), "map")
        .expect("golden check");

    assert!(rp.cleanup());
}

#[test]
fn mapping_errors_reg() {
    let mut rp = RegParams::new("mapping_errors");

    let (source, _) =
        ProvinceDefinitions::load_definitions(&fixtures::grid_definitions(2, 1)).expect("source");
    let (target, _) =
        ProvinceDefinitions::load_definitions(&fixtures::grid_definitions(2, 1)).expect("target");

    let text = "1 = 1\nNowhere = 2\n2 = 1\n2 = 2 =\npoint a,b -> 1,1\n2 = 2\n";
    let (mapper, report) = LinkMapper::load_mappings(text, &source, &target);
    rp.compare_values(2.0, report.links as f64, 0.0);
    rp.compare_values(4.0, report.skipped.len() as f64, 0.0);
    rp.compare_bool(
        true,
        matches!(
            &report.skipped[0],
            LinkError::UnresolvedProvince { line: 2, reference, .. } if reference == "Nowhere"
        ),
    );
    rp.compare_bool(
        true,
        matches!(
            report.skipped[1],
            LinkError::ProvinceAlreadyLinked {
                side: Side::Target,
                id: 1,
                ..
            }
        ),
    );
    rp.compare_bool(true, matches!(report.skipped[2], LinkError::MalformedRow { line: 4, .. }));
    rp.compare_bool(true, matches!(report.skipped[3], LinkError::MalformedRow { line: 5, .. }));
    rp.compare_strings(b"1 = 1\n2 = 2\n", mapper.save_mappings(0).unwrap_or_default().as_bytes());

    // an empty table still yields one version to work in
    let (empty, report) = LinkMapper::load_mappings("", &source, &target);
    rp.compare_bool(true, report.is_clean());
    rp.compare_values(1.0, empty.versions().len() as f64, 0.0);

    assert!(rp.cleanup());
}

#[test]
fn mapping_comments_reg() {
    let mut rp = RegParams::new("mapping_comments");

    let (source, _) =
        ProvinceDefinitions::load_definitions(&fixtures::grid_definitions(3, 2)).expect("source");
    let (target, _) =
        ProvinceDefinitions::load_definitions(&fixtures::grid_definitions(3, 2)).expect("target");

    let comments = [
        "the \"old capital",
        "\"quoted\" both ends \"",
        "a = b, c # d",
        "first line\nsecond line\r\n",
    ];
    let mut mapper = LinkMapper::new();
    let version = mapper.active_version_mut();
    for (i, comment) in comments.iter().enumerate() {
        let id = i as u32 + 1;
        let link = version.add_link([id], [id]).expect("link");
        version
            .set_comment(link, Some(comment.to_string()))
            .expect("comment");
    }
    // line breaks never reach the table
    rp.compare_bool(
        true,
        version.links()[3].comment() == Some("first line second line"),
    );

    let saved = mapper.save_all();
    rp.compare_values(
        (comments.len() + 1) as f64,
        saved.lines().count() as f64,
        0.0,
    );
    let (reloaded, report) = LinkMapper::load_mappings(&saved, &source, &target);
    rp.compare_bool(true, report.is_clean());
    rp.compare_values(4.0, reloaded.active_version().link_count() as f64, 0.0);
    for (a, b) in mapper
        .active_version()
        .links()
        .iter()
        .zip(reloaded.active_version().links())
    {
        rp.compare_bool(true, a.comment() == b.comment());
        rp.compare_bool(true, a.source_provinces() == b.source_provinces());
    }
    rp.compare_strings(saved.as_bytes(), reloaded.save_all().as_bytes());

    assert!(rp.cleanup());
}
