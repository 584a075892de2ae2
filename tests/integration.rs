//! End-to-end inspections of synthetic curtain-wall facades

use facade_flatness::{
    image_io, inspect, inspect_image, report,
    types::{Error, InspectionConfig, LineConfig, MatchMethod},
};
use image::{Rgb, RgbImage};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const GLASS: Rgb<u8> = Rgb([200, 200, 200]);
const MULLION: Rgb<u8> = Rgb([20, 20, 20]);
const SCENE: Rgb<u8> = Rgb([200, 60, 60]);

const WIDTH: u32 = 1400;
const HEIGHT: u32 = 1000;
/// Mullion positions; 3 pane columns by 2 pane rows between them
const COLUMN_LINES: [u32; 4] = [100, 500, 900, 1300];
const ROW_LINES: [u32; 3] = [100, 500, 900];
const MULLION_WIDTH: u32 = 8;
const PANE: u32 = 400;

/// Pane 3 is column 1, row 1 in column-major order
const TILTED_PANE: (u32, u32) = (1, 1);

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn fill(image: &mut RgbImage, xs: std::ops::Range<u32>, ys: std::ops::Range<u32>, color: Rgb<u8>) {
    for y in ys {
        for x in xs.clone() {
            image.put_pixel(x, y, color);
        }
    }
}

/// Generate a 3x2 facade where every pane reflects one vertical and one
/// horizontal band of scenery. A tilted pane sees its reflection displaced.
fn generate_facade(tilt: Option<(u32, u32)>, displacement: u32) -> RgbImage {
    let mut image = RgbImage::from_pixel(WIDTH, HEIGHT, GLASS);

    for column in 0..3 {
        for row in 0..2 {
            let left = COLUMN_LINES[0] + column * PANE;
            let top = ROW_LINES[0] + row * PANE;
            let shift = if tilt == Some((column, row)) { displacement } else { 0 };

            fill(
                &mut image,
                left + 150 + shift..left + 190 + shift,
                top..top + PANE,
                SCENE,
            );
            fill(
                &mut image,
                left..left + PANE,
                top + 150 + shift..top + 190 + shift,
                SCENE,
            );
        }
    }

    for &x in &COLUMN_LINES {
        fill(&mut image, x..x + MULLION_WIDTH, 0..HEIGHT, MULLION);
    }
    for &y in &ROW_LINES {
        fill(&mut image, 0..WIDTH, y..y + MULLION_WIDTH, MULLION);
    }

    image
}

fn test_config(method: MatchMethod) -> InspectionConfig {
    InspectionConfig {
        method,
        lines: LineConfig {
            min_length: 60,
            vertical_min_separation: 350,
            horizontal_min_separation: 350,
            ..LineConfig::default()
        },
        skip_preprocess: true,
        ..InspectionConfig::default()
    }
}

fn fixture_path(name: &str) -> PathBuf {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    std::fs::create_dir_all(&dir).expect("create fixtures dir");
    dir.join(name)
}

fn pair_outcomes(results: &[facade_flatness::types::MatchResult]) -> Vec<(usize, usize, bool)> {
    results
        .iter()
        .map(|r| (r.pane_a, r.pane_b, r.is_match))
        .collect()
}

#[test]
fn test_flat_facade_all_pairs_match() {
    init_logging();
    let image = generate_facade(None, 0);

    for method in [MatchMethod::Chroma, MatchMethod::Contours] {
        let inspection = inspect(&image, &test_config(method)).unwrap();
        let report = &inspection.report;

        assert_eq!(report.columns, 3, "{}", method);
        assert_eq!(report.panes.len(), 6, "{}", method);
        assert_eq!(
            pair_outcomes(&report.results),
            vec![
                (0, 1, true),
                (0, 2, true),
                (1, 3, true),
                (2, 3, true),
                (2, 4, true),
                (3, 5, true),
                (4, 5, true),
            ],
            "{}",
            method
        );
    }
}

#[test]
fn test_tilted_pane_breaks_its_seams() {
    init_logging();
    let image = generate_facade(Some(TILTED_PANE), 50);

    for method in [MatchMethod::Chroma, MatchMethod::Contours] {
        let inspection = inspect(&image, &test_config(method)).unwrap();
        assert_eq!(
            pair_outcomes(&inspection.report.results),
            vec![
                (0, 1, true),
                (0, 2, true),
                (1, 3, false),
                (2, 3, false),
                (2, 4, true),
                (3, 5, false),
                (4, 5, true),
            ],
            "{}",
            method
        );
        assert_eq!(inspection.report.suspect_panes(), vec![3], "{}", method);
    }
}

#[test]
fn test_pairs_evaluated_once() {
    let image = generate_facade(None, 0);
    let inspection = inspect(&image, &test_config(MatchMethod::Chroma)).unwrap();

    let mut seen = HashSet::new();
    for result in &inspection.report.results {
        assert!(result.pane_a < result.pane_b);
        assert!(seen.insert((result.pane_a, result.pane_b)));
    }
    // 2 vertical seams x 2 rows + 1 horizontal seam x 3 columns
    assert_eq!(seen.len(), 7);
}

#[test]
fn test_pane_boxes_exclude_mullions() {
    let image = generate_facade(None, 0);
    let inspection = inspect(&image, &test_config(MatchMethod::Chroma)).unwrap();

    for pane in &inspection.report.panes {
        let rect = pane.rect;
        assert!(rect.width > 300 && rect.width < PANE, "{:?}", rect);
        assert!(rect.height > 250 && rect.height < PANE, "{:?}", rect);
        for &x in &COLUMN_LINES {
            assert!(rect.x > x + MULLION_WIDTH || rect.x + rect.width <= x, "{:?}", rect);
        }
        for &y in &ROW_LINES {
            assert!(rect.y > y + MULLION_WIDTH || rect.y + rect.height <= y, "{:?}", rect);
        }
    }

    // Column-major numbering: pane 1 sits below pane 0
    let panes = &inspection.report.panes;
    assert_eq!((panes[1].column, panes[1].row), (0, 1));
    assert_eq!(panes[0].adjacency.down, Some(1));
    assert_eq!(panes[1].adjacency.up, Some(0));
    assert_eq!(panes[0].adjacency.right, Some(2));
    assert_eq!(panes[0].adjacency.left, None);
}

#[test]
fn test_inspect_image_writes_annotation_and_report() {
    init_logging();
    let input = fixture_path("facade_tilted.png");
    let output = fixture_path("facade_tilted_inspected.png");
    let report_path = fixture_path("facade_tilted_report.json");

    generate_facade(Some(TILTED_PANE), 50).save(&input).unwrap();

    let report = inspect_image(&input, &output, &test_config(MatchMethod::Contours)).unwrap();
    assert_eq!(report.mismatched(), 3);

    let annotated = image_io::load_image(&output).unwrap();
    assert_eq!(annotated.dimensions(), (WIDTH, HEIGHT));
    let config = test_config(MatchMethod::Contours);
    let first = report.panes[0].rect;
    assert_eq!(
        annotated.get_pixel(first.x, first.y),
        &Rgb(config.annotation.color)
    );

    report::write_json(&report_path, &report).unwrap();
    let text = std::fs::read_to_string(&report_path).unwrap();
    let parsed: report::InspectionReport = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, report);

    let entries = serde_json::to_value(report::consumer_entries(&report)).unwrap();
    assert_eq!(
        entries[2],
        serde_json::json!({"edgePair": [1, 3], "isMatch": false})
    );

    std::fs::remove_file(input).ok();
    std::fs::remove_file(output).ok();
    std::fs::remove_file(report_path).ok();
}

#[test]
fn test_unreadable_input_rejected() {
    let input = fixture_path("not_an_image.png");
    std::fs::write(&input, b"definitely not a PNG").unwrap();
    let output = fixture_path("not_an_image_inspected.png");

    let result = inspect_image(&input, &output, &test_config(MatchMethod::Chroma));
    assert!(matches!(result, Err(Error::UnreadableInput(_))));
    assert!(!output.exists());

    std::fs::remove_file(input).ok();
}

#[test]
fn test_config_file_round_trip() {
    let path = fixture_path("inspection_config.json");
    let config = test_config(MatchMethod::Contours);
    std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

    let loaded = InspectionConfig::load(&path).unwrap();
    assert_eq!(loaded, config);

    std::fs::remove_file(path).ok();
}
