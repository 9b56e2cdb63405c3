//! PAGE-XML ground truth.
//!
//! Only the top-level regions of `<Page>` are read. Each region contributes
//! its category and the polygon of its `<Coords>` element, given either as a
//! `points="x,y x,y ..."` attribute or as `<Point x=".." y=".."/>` children.
//! Coordinates are top-down; [`AnnotatedRegion::to_region`] flips them into
//! page space.

use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::model::{BlockCategory, Point, Rect, Region};

/// A region annotated in a ground-truth file.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedRegion {
    /// Region id, if the file gives one
    pub id: Option<String>,
    /// Category mapped from the region element and type
    pub category: BlockCategory,
    /// Polygon in top-down coordinates
    pub polygon: Vec<Point>,
}

impl AnnotatedRegion {
    /// Whether this is a body-text paragraph.
    pub fn is_paragraph(&self) -> bool {
        self.category == BlockCategory::Text
    }

    /// Axis-aligned bounds in page space (`y' = page_height - y`), labeled.
    pub fn to_region(&self, page_height: f64) -> Result<Region> {
        let bound = Rect::from_points(
            self.polygon
                .iter()
                .map(|p| Point::new(p.x, page_height - p.y)),
        )
        .ok_or_else(|| {
            Error::InvalidCoordinates(format!(
                "region {} has no points",
                self.id.as_deref().unwrap_or("?")
            ))
        })?;
        Ok(Region::labeled(bound, self.category))
    }
}

/// The annotated regions of one page, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageAnnotation {
    pub regions: Vec<AnnotatedRegion>,
}

impl PageAnnotation {
    /// Read and parse a ground-truth file.
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        parse_page_xml(&content)
    }
}

/// Map a region element (and its `type` attribute) to a category.
pub fn category_for(element: &str, region_type: Option<&str>) -> Result<BlockCategory> {
    match (element, region_type) {
        ("TextRegion", Some("paragraph")) => Ok(BlockCategory::Text),
        ("TextRegion", Some("heading")) => Ok(BlockCategory::Title),
        ("TextRegion", Some("list-label")) => Ok(BlockCategory::List),
        ("TextRegion", Some(other)) => Err(Error::UnknownRegionType(format!(
            "TextRegion type '{}'",
            other
        ))),
        ("TextRegion", None) => Err(Error::UnknownRegionType(
            "TextRegion without type".to_string(),
        )),
        ("TableRegion", _) => Ok(BlockCategory::Table),
        ("ImageRegion", _) => Ok(BlockCategory::Image),
        (other, _) => Err(Error::UnknownRegionType(other.to_string())),
    }
}

/// Parse a `points` attribute: space-separated `x,y` pairs.
pub fn parse_points(points: &str) -> Result<Vec<Point>> {
    points
        .split_whitespace()
        .map(|pair| {
            let (x, y) = pair
                .split_once(',')
                .ok_or_else(|| Error::InvalidCoordinates(pair.to_string()))?;
            let x: f64 = x
                .trim()
                .parse()
                .map_err(|_| Error::InvalidCoordinates(pair.to_string()))?;
            let y: f64 = y
                .trim()
                .parse()
                .map_err(|_| Error::InvalidCoordinates(pair.to_string()))?;
            Ok(Point::new(x, y))
        })
        .collect()
}

struct PendingRegion {
    depth: usize,
    id: Option<String>,
    category: BlockCategory,
    polygon: Vec<Point>,
}

fn attribute(e: &BytesStart<'_>, key: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key.as_bytes())
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

fn coordinate(e: &BytesStart<'_>, key: &str) -> Result<f64> {
    let raw = attribute(e, key)
        .ok_or_else(|| Error::InvalidCoordinates(format!("Point without {}", key)))?;
    raw.trim()
        .parse()
        .map_err(|_| Error::InvalidCoordinates(raw))
}

/// Parse the content of a PAGE-XML file.
pub fn parse_page_xml(xml: &str) -> Result<PageAnnotation> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut page_depth: Option<usize> = None;
    let mut coords_depth: Option<usize> = None;
    let mut current: Option<PendingRegion> = None;
    let mut regions = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf)?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();

                if name == "Page" && page_depth.is_none() {
                    page_depth = Some(depth);
                } else if page_depth.is_some_and(|d| depth == d + 1) && name.ends_with("Region") {
                    let region_type = attribute(e, "type");
                    let category = category_for(&name, region_type.as_deref())?;
                    current = Some(PendingRegion {
                        depth,
                        id: attribute(e, "id"),
                        category,
                        polygon: Vec::new(),
                    });
                } else if name == "Coords"
                    && current.as_ref().is_some_and(|r| depth == r.depth + 1)
                {
                    if let (Some(points), Some(region)) = (attribute(e, "points"), current.as_mut())
                    {
                        region.polygon = parse_points(&points)?;
                    } else if !is_empty {
                        coords_depth = Some(depth);
                    }
                } else if name == "Point" && coords_depth.is_some_and(|d| depth == d + 1) {
                    let point = Point::new(coordinate(e, "x")?, coordinate(e, "y")?);
                    if let Some(region) = current.as_mut() {
                        region.polygon.push(point);
                    }
                }

                if is_empty {
                    if current.as_ref().is_some_and(|r| r.depth == depth) {
                        finish_region(&mut current, &mut regions)?;
                    }
                } else {
                    depth += 1;
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if coords_depth == Some(depth) {
                    coords_depth = None;
                }
                if current.as_ref().is_some_and(|r| r.depth == depth) {
                    finish_region(&mut current, &mut regions)?;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if page_depth.is_none() {
        return Err(Error::GroundTruth("missing <Page> element".to_string()));
    }

    Ok(PageAnnotation { regions })
}

fn finish_region(
    current: &mut Option<PendingRegion>,
    regions: &mut Vec<AnnotatedRegion>,
) -> Result<()> {
    if let Some(region) = current.take() {
        if region.polygon.is_empty() {
            return Err(Error::InvalidCoordinates(format!(
                "region {} has no coordinates",
                region.id.as_deref().unwrap_or("?")
            )));
        }
        regions.push(AnnotatedRegion {
            id: region.id,
            category: region.category,
            polygon: region.polygon,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<PcGts xmlns="http://schema.primaresearch.org/PAGE/gts/pagecontent/2019-07-15">
  <Metadata><Creator>test</Creator></Metadata>
  <Page imageFilename="doc.pdf" imageWidth="612" imageHeight="792">
    <TextRegion id="r1" type="heading">
      <Coords points="10,20 110,20 110,40 10,40"/>
      <TextLine id="l1"><Coords points="0,0 1,1"/></TextLine>
    </TextRegion>
    <TextRegion id="r2" type="paragraph">
      <Coords><Point x="10" y="50"/><Point x="200" y="120"/></Coords>
    </TextRegion>
    <TableRegion id="r3"><Coords points="0,300 300,300 300,500 0,500"/></TableRegion>
    <ImageRegion id="r4"><Coords points="300,600 400,700"/></ImageRegion>
  </Page>
</PcGts>"#;

    #[test]
    fn test_parse_regions() {
        let page = parse_page_xml(SAMPLE).unwrap();
        let categories: Vec<BlockCategory> = page.regions.iter().map(|r| r.category).collect();
        assert_eq!(
            categories,
            vec![
                BlockCategory::Title,
                BlockCategory::Text,
                BlockCategory::Table,
                BlockCategory::Image
            ]
        );
        // TextLine coordinates do not leak into the region polygon.
        assert_eq!(page.regions[0].polygon.len(), 4);
        assert_eq!(page.regions[1].polygon.len(), 2);
        assert!(page.regions[1].is_paragraph());
    }

    #[test]
    fn test_region_y_flip() {
        let page = parse_page_xml(SAMPLE).unwrap();
        let region = page.regions[0].to_region(792.0).unwrap();
        assert_eq!(region.bound, Rect::new(10.0, 752.0, 110.0, 772.0));
        assert_eq!(region.category, Some(BlockCategory::Title));
    }

    #[test]
    fn test_unknown_region_type() {
        let xml = r#"<PcGts><Page><GraphicRegion id="g"><Coords points="0,0 1,1"/></GraphicRegion></Page></PcGts>"#;
        assert!(matches!(
            parse_page_xml(xml),
            Err(Error::UnknownRegionType(t)) if t == "GraphicRegion"
        ));

        let xml = r#"<PcGts><Page><TextRegion type="footer"><Coords points="0,0 1,1"/></TextRegion></Page></PcGts>"#;
        assert!(matches!(
            parse_page_xml(xml),
            Err(Error::UnknownRegionType(_))
        ));
    }

    #[test]
    fn test_missing_coords() {
        let xml = r#"<PcGts><Page><TableRegion id="t"/></Page></PcGts>"#;
        assert!(matches!(
            parse_page_xml(xml),
            Err(Error::InvalidCoordinates(_))
        ));
    }

    #[test]
    fn test_parse_points() {
        let points = parse_points("1,2 3.5,4").unwrap();
        assert_eq!(points, vec![Point::new(1.0, 2.0), Point::new(3.5, 4.0)]);
        assert!(parse_points("1;2").is_err());
        assert!(parse_points("a,2").is_err());
    }

    #[test]
    fn test_category_for() {
        assert_eq!(
            category_for("TextRegion", Some("list-label")).unwrap(),
            BlockCategory::List
        );
        assert!(category_for("SeparatorRegion", None).is_err());
    }
}
