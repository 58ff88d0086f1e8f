use crate::error::{Error, Result};
use crate::types::{Color, PathSegment, Subpath, VectorDocument, VectorPath};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use std::fmt::Write as _;

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Decimal places kept for every coordinate
pub const COORDINATE_PRECISION: usize = 2;

/// Format a number with fixed precision, trailing zeros trimmed and -0 as 0
fn f(n: f64) -> String {
    let s = format!("{:.*}", COORDINATE_PRECISION, n);
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s.as_str()
    };
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

fn hex_color(color: &Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color[0], color[1], color[2])
}

fn write_subpath(d: &mut String, subpath: &Subpath) {
    let _ = write!(d, "M{} {}", f(subpath.start.x), f(subpath.start.y));

    let count = subpath.segments.len();
    for (i, segment) in subpath.segments.iter().enumerate() {
        match segment {
            // The closing edge back to the start is implied by Z
            PathSegment::Line(to) if i + 1 == count && *to == subpath.start => {}
            PathSegment::Line(to) => {
                let _ = write!(d, "L{} {}", f(to.x), f(to.y));
            }
            PathSegment::Cubic { ctrl1, ctrl2, to } => {
                let _ = write!(
                    d,
                    "C{} {} {} {} {} {}",
                    f(ctrl1.x),
                    f(ctrl1.y),
                    f(ctrl2.x),
                    f(ctrl2.y),
                    f(to.x),
                    f(to.y)
                );
            }
        }
    }
    d.push('Z');
}

/// Build the `d` attribute for all subpaths of a path
pub fn path_data(path: &VectorPath) -> String {
    let mut d = String::new();
    for subpath in &path.subpaths {
        write_subpath(&mut d, subpath);
    }
    d
}

fn write_event<'a>(writer: &mut Writer<Vec<u8>>, event: impl Into<Event<'a>>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::Encoding(format!("failed to write SVG markup: {}", e)))
}

/// Serialize a document as UTF-8 SVG markup.
///
/// The root carries explicit `width`/`height` and a `viewBox` matching the
/// canvas; paths follow in document (back-to-front) order.
pub fn emit(document: &VectorDocument) -> Result<Vec<u8>> {
    let width = document.width.to_string();
    let height = document.height.to_string();
    let view_box = format!("0 0 {} {}", width, height);

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write_event(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;

    let mut root = BytesStart::new("svg");
    root.push_attribute(("xmlns", SVG_NAMESPACE));
    root.push_attribute(("width", width.as_str()));
    root.push_attribute(("height", height.as_str()));
    root.push_attribute(("viewBox", view_box.as_str()));
    write_event(&mut writer, Event::Start(root))?;

    for path in &document.paths {
        if path.is_empty() {
            return Err(Error::Encoding("vector path without subpaths".to_string()));
        }

        let d = path_data(path);
        let fill = hex_color(&path.fill);
        let mut element = BytesStart::new("path");
        element.push_attribute(("d", d.as_str()));
        element.push_attribute(("fill", fill.as_str()));
        if path.fill[3] < 255 {
            let opacity = f(path.fill[3] as f64 / 255.0);
            element.push_attribute(("fill-opacity", opacity.as_str()));
        }
        element.push_attribute(("fill-rule", path.fill_rule.as_svg()));
        write_event(&mut writer, Event::Empty(element))?;
    }

    write_event(&mut writer, Event::End(BytesEnd::new("svg")))?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FillRule, Point};
    use pretty_assertions::assert_eq;

    fn square_path(fill: Color) -> VectorPath {
        VectorPath {
            subpaths: vec![Subpath {
                start: Point::new(0.0, 0.0),
                segments: vec![
                    PathSegment::Line(Point::new(4.0, 0.0)),
                    PathSegment::Line(Point::new(4.0, 4.0)),
                    PathSegment::Line(Point::new(0.0, 4.0)),
                    PathSegment::Line(Point::new(0.0, 0.0)),
                ],
            }],
            fill,
            fill_rule: FillRule::NonZero,
        }
    }

    #[test]
    fn test_number_format() {
        assert_eq!(f(256.0), "256");
        assert_eq!(f(1.5), "1.5");
        assert_eq!(f(1.23456), "1.23");
        assert_eq!(f(-0.001), "0");
        assert_eq!(f(-2.5), "-2.5");
        assert_eq!(f(0.333333), "0.33");
    }

    #[test]
    fn test_path_data_closes_with_z() {
        assert_eq!(path_data(&square_path([0, 0, 0, 255])), "M0 0L4 0L4 4L0 4Z");
    }

    #[test]
    fn test_cubic_path_data() {
        let path = VectorPath {
            subpaths: vec![Subpath {
                start: Point::new(0.0, 0.0),
                segments: vec![
                    PathSegment::Cubic {
                        ctrl1: Point::new(1.0, -1.0),
                        ctrl2: Point::new(2.0, -1.0),
                        to: Point::new(3.0, 0.0),
                    },
                    PathSegment::Line(Point::new(0.0, 0.0)),
                ],
            }],
            fill: [0, 0, 0, 255],
            fill_rule: FillRule::EvenOdd,
        };
        assert_eq!(path_data(&path), "M0 0C1 -1 2 -1 3 0Z");
    }

    #[test]
    fn test_emit_document() {
        let doc = VectorDocument {
            width: 4,
            height: 4,
            paths: vec![square_path([255, 0, 0, 255]), square_path([0, 0, 255, 128])],
        };
        let svg = String::from_utf8(emit(&doc).unwrap()).unwrap();
        let expected = concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"4\" height=\"4\" viewBox=\"0 0 4 4\">\n",
            "  <path d=\"M0 0L4 0L4 4L0 4Z\" fill=\"#ff0000\" fill-rule=\"nonzero\"/>\n",
            "  <path d=\"M0 0L4 0L4 4L0 4Z\" fill=\"#0000ff\" fill-opacity=\"0.5\" fill-rule=\"nonzero\"/>\n",
            "</svg>\n",
        );
        assert_eq!(svg, expected);
    }

    #[test]
    fn test_empty_path_is_an_encoding_error() {
        let doc = VectorDocument {
            width: 1,
            height: 1,
            paths: vec![VectorPath::new([0, 0, 0, 255])],
        };
        assert!(matches!(emit(&doc), Err(Error::Encoding(_))));
    }
}
