//! Integration tests for block feature extraction.

use pdfblocks::features::{FeatureExtractor, FeatureSchema, PageContext};
use pdfblocks::model::{
    BookmarkNode, Document, Glyph, Page, Path, PathCommand, Point, RasterImage, Rect,
};
use pdfblocks::{extract_features, Error};

/// Glyphs of `text` laid out left to right, 6 wide and 10 high.
fn glyphs(text: &str, x: f64, y: f64) -> Vec<Glyph> {
    text.chars()
        .enumerate()
        .map(|(i, c)| {
            let left = x + i as f64 * 6.0;
            Glyph::new(c.to_string(), Rect::new(left, y, left + 6.0, y + 10.0))
        })
        .collect()
}

fn rectangle(left: f64, bottom: f64, right: f64, top: f64) -> Path {
    Path::new(vec![
        PathCommand::Move {
            to: Point::new(left, bottom),
        },
        PathCommand::line(Point::new(left, bottom), Point::new(right, bottom)),
        PathCommand::line(Point::new(right, bottom), Point::new(right, top)),
        PathCommand::line(Point::new(right, top), Point::new(left, top)),
        PathCommand::line(Point::new(left, top), Point::new(left, bottom)),
        PathCommand::Close,
    ])
}

fn document() -> Document {
    let mut page = Page::new(1, 612.0, 792.0);
    page.letters.extend(glyphs("Intro", 100.0, 700.0));
    page.letters.extend(glyphs("2024", 100.0, 600.0));
    page.paths.push(rectangle(100.0, 300.0, 200.0, 400.0));
    page.paths.push(Path::new(vec![PathCommand::bezier(
        Point::new(120.0, 320.0),
        Point::new(130.0, 340.0),
        Point::new(150.0, 340.0),
        Point::new(160.0, 320.0),
    )]));
    page.images
        .push(RasterImage::new(Rect::new(350.0, 100.0, 400.0, 150.0)));

    let mut doc = Document::new("paper.json");
    doc.add_page(page);
    doc.add_bookmark(BookmarkNode::new("Intro", Some(1), 0));
    doc
}

#[test]
fn test_text_region_v1() {
    let doc = document();
    let bound = Rect::new(90.0, 690.0, 200.0, 720.0);
    let f = extract_features(&doc, 1, &bound, FeatureSchema::V1).unwrap();

    assert_eq!(f.len(), 13);
    assert_eq!(f.get("charsCount"), Some(5.0));
    assert_eq!(f.get("pctAlphabeticalChars"), Some(1.0));
    assert_eq!(f.get("pctNumericChars"), Some(0.0));
    assert_eq!(f.get("deltaToHeight"), Some(1.0));
    assert_eq!(f.get("pathsCount"), Some(0.0));
    assert_eq!(f.get("imagesCount"), Some(0.0));
    assert_eq!(f.get("blockAspectRatio"), None);
}

#[test]
fn test_text_region_v2_matches_bookmark() {
    let doc = document();
    let bound = Rect::new(90.0, 690.0, 200.0, 720.0);
    let f = extract_features(&doc, 1, &bound, FeatureSchema::V2).unwrap();

    assert_eq!(f.len(), 17);
    assert_eq!(f.get("charsCount"), Some(5.0));
    assert_eq!(f.get("wordsCount"), Some(1.0));
    assert_eq!(f.get("linesCount"), Some(1.0));
    assert_eq!(f.get("blockAspectRatio"), Some(3.0));
    assert_eq!(f.get("bestNormEditDistance"), Some(0.0));
}

#[test]
fn test_numeric_region() {
    let doc = document();
    let bound = Rect::new(90.0, 590.0, 200.0, 620.0);
    let f = extract_features(&doc, 1, &bound, FeatureSchema::V2).unwrap();
    assert_eq!(f.get("pctNumericChars"), Some(1.0));
    assert_eq!(f.get("bestNormEditDistance"), Some(1.0));
}

#[test]
fn test_drawing_region() {
    let doc = document();
    let bound = Rect::new(90.0, 290.0, 210.0, 410.0);
    let f = extract_features(&doc, 1, &bound, FeatureSchema::V1).unwrap();

    // Four lines and one curve; Move and Close are not drawing commands.
    assert_eq!(f.get("pathsCount"), Some(5.0));
    assert_eq!(f.get("pctBezierPaths"), Some(0.2));
    assert_eq!(f.get("pctHorPaths"), Some(0.4));
    assert_eq!(f.get("pctVertPaths"), Some(0.4));
    assert_eq!(f.get("pctOblPaths"), Some(0.0));
    assert_eq!(f.get("charsCount"), Some(0.0));
    assert_eq!(f.get("deltaToHeight"), Some(-1.0));
}

#[test]
fn test_image_region() {
    let doc = document();
    let bound = Rect::new(300.0, 50.0, 400.0, 150.0);
    let f = extract_features(&doc, 1, &bound, FeatureSchema::V2).unwrap();

    assert_eq!(f.get("imagesCount"), Some(1.0));
    assert_eq!(f.get("imageAvgProportion"), Some(0.25));
    assert!(f.get("deltaToHeight").unwrap().is_nan());
    assert!(f.get("blockAspectRatio").unwrap().is_nan());
    assert!(f.get("bestNormEditDistance").unwrap().is_nan());
}

#[test]
fn test_partially_covered_glyphs() {
    let doc = document();
    // Cuts through the middle of "Intro".
    let bound = Rect::new(90.0, 690.0, 115.0, 720.0);

    let v1 = extract_features(&doc, 1, &bound, FeatureSchema::V1).unwrap();
    let v2 = extract_features(&doc, 1, &bound, FeatureSchema::V2).unwrap();
    assert_eq!(v1.get("charsCount"), Some(2.0));
    assert_eq!(v2.get("charsCount"), Some(3.0));
}

#[test]
fn test_page_out_of_range() {
    let doc = document();
    let bound = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert!(matches!(
        extract_features(&doc, 2, &bound, FeatureSchema::V1),
        Err(Error::PageOutOfRange(2, 1))
    ));
}

#[test]
fn test_extractor_is_deterministic() {
    let doc = document();
    let page = doc.get_page(1).unwrap();
    let ctx = PageContext::for_page(&doc, page);
    let extractor = FeatureExtractor::new(FeatureSchema::V2);
    let bound = Rect::new(0.0, 0.0, 612.0, 792.0);

    let first = extractor.extract_region(&ctx, &bound).unwrap();
    let second = extractor.extract_region(&ctx, &bound).unwrap();
    let bits = |v: &[f32]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(first.values()), bits(second.values()));
}
