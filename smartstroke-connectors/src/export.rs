//! Notebook export to JSON
//!
//! The document is self-describing so a renderer can redraw without the
//! core:
//!
//! ```text
//! {"format":"smartstroke-notebook","version":"0.1.0","active_page":0,
//!  "pages":[{"strokes":[{"color":"#1e3a8a",
//!                        "points":[{"x":..,"y":..,"pressure":..,"width":..}]}]}]}
//! ```

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use serde::Serialize;
use smartstroke_core::{Notebook, Page, Stroke, StrokePoint};

use crate::ConnectorResult;

const FORMAT: &str = "smartstroke-notebook";

#[derive(Serialize)]
struct NotebookDocument {
    format: &'static str,
    version: &'static str,
    active_page: usize,
    pages: Vec<PageDocument>,
}

#[derive(Serialize)]
struct PageDocument {
    strokes: Vec<StrokeDocument>,
}

#[derive(Serialize)]
struct StrokeDocument {
    color: String,
    points: Vec<PointDocument>,
}

#[derive(Serialize)]
struct PointDocument {
    x: f32,
    y: f32,
    pressure: u16,
    width: f32,
}

impl From<&StrokePoint> for PointDocument {
    fn from(point: &StrokePoint) -> Self {
        Self {
            x: point.x,
            y: point.y,
            pressure: point.pressure,
            width: point.line_width(),
        }
    }
}

impl From<&Stroke> for StrokeDocument {
    fn from(stroke: &Stroke) -> Self {
        Self {
            color: stroke.color().to_string(),
            points: stroke.points().iter().map(PointDocument::from).collect(),
        }
    }
}

impl From<&Page> for PageDocument {
    fn from(page: &Page) -> Self {
        Self {
            strokes: page.strokes().iter().map(StrokeDocument::from).collect(),
        }
    }
}

impl From<&Notebook> for NotebookDocument {
    fn from(notebook: &Notebook) -> Self {
        Self {
            format: FORMAT,
            version: smartstroke_core::VERSION,
            active_page: notebook.active_index(),
            pages: notebook.pages().iter().map(PageDocument::from).collect(),
        }
    }
}

/// Serialize `notebook` as JSON into `writer`
pub fn write_notebook<W: Write>(notebook: &Notebook, mut writer: W) -> ConnectorResult<()> {
    serde_json::to_writer_pretty(&mut writer, &NotebookDocument::from(notebook))?;
    writer.flush()?;
    Ok(())
}

/// Write `notebook` as JSON to the file at `path`, replacing it
pub fn export_notebook<P: AsRef<Path>>(notebook: &Notebook, path: P) -> ConnectorResult<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_notebook(notebook, BufWriter::new(file))?;

    log::info!(
        "Exported {} pages ({} strokes) to {}",
        notebook.pages().len(),
        notebook.stroke_count(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use smartstroke_core::{Point2, StrokeColor};

    fn notebook() -> Notebook {
        let mut notebook = Notebook::new();
        let points = vec![
            StrokePoint::new(Point2::new(1.0, 2.0), 0),
            StrokePoint::new(Point2::new(3.0, 4.0), 4095),
        ];
        notebook.seal(Stroke::new(points, StrokeColor::ORANGE));
        notebook.next_page();
        notebook
    }

    #[test]
    fn document_shape() {
        let mut buffer = Vec::new();
        write_notebook(&notebook(), &mut buffer).unwrap();

        let doc: Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(doc["format"], "smartstroke-notebook");
        assert_eq!(doc["active_page"], 1);
        assert_eq!(doc["pages"].as_array().map(Vec::len), Some(2));

        let stroke = &doc["pages"][0]["strokes"][0];
        assert_eq!(stroke["color"], "#f97316");
        assert_eq!(stroke["points"][0]["width"], 1.0);
        assert_eq!(stroke["points"][1]["width"], 4.0);
        assert_eq!(stroke["points"][1]["pressure"], 4095);
        assert!(doc["pages"][1]["strokes"].as_array().unwrap().is_empty());
    }

    #[test]
    fn exports_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");

        export_notebook(&notebook(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let doc: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc["pages"][0]["strokes"][0]["points"][0]["x"], 1.0);
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("notes.json");

        assert!(matches!(
            export_notebook(&notebook(), &path),
            Err(crate::ConnectorError::Io(_))
        ));
    }
}
