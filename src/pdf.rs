// printpdf backend: replays a display list into a PDF file.

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::layout::{self, FontStyle};
use crate::render::{Document, DrawOp};

/// Millimetres to points, for stroke widths.
const MM_TO_PT: f32 = 72.0 / 25.4;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn get(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
        }
    }
}

/// Build the PDF for `document` and write it to `output_path`.
///
/// A partially written file is removed when saving fails.
pub fn write_pdf(document: &Document, output_path: &Path) -> Result<(), AppError> {
    let pdf = build_pdf(document)?;

    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    if let Err(e) = pdf.save(&mut writer) {
        drop(writer);
        if std::fs::remove_file(output_path).is_err() {
            warn!(path = %output_path.display(), "could not remove incomplete file");
        }
        return Err(AppError::PdfError(e.to_string()));
    }

    debug!(path = %output_path.display(), pages = document.pages.len(), "pdf written");
    Ok(())
}

fn build_pdf(document: &Document) -> Result<PdfDocumentReference, AppError> {
    let width = Mm(document.page_width);
    let height = Mm(document.page_height);

    let (doc, page1, layer1) = PdfDocument::new(&document.title, width, height, "Layer 1");

    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| AppError::PdfError(e.to_string()))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| AppError::PdfError(e.to_string()))?,
    };

    for (n, page) in document.pages.iter().enumerate() {
        let layer = if n == 0 {
            doc.get_page(page1).get_layer(layer1)
        } else {
            let (page_idx, layer_idx) = doc.add_page(width, height, "Layer 1");
            doc.get_page(page_idx).get_layer(layer_idx)
        };
        let canvas = Canvas {
            layer: &layer,
            fonts: &fonts,
            page_height: document.page_height,
        };
        for op in &page.ops {
            canvas.draw(op);
        }
    }

    Ok(doc)
}

// ============================================================================
// Drawing Utilities
// ============================================================================

/// One page layer plus the top-left to bottom-left coordinate flip.
struct Canvas<'a> {
    layer: &'a PdfLayerReference,
    fonts: &'a Fonts,
    page_height: f32,
}

impl Canvas<'_> {
    fn point(&self, x: f32, y: f32) -> (Point, bool) {
        (Point::new(Mm(x), Mm(self.page_height - y)), false)
    }

    fn rect_points(&self, x: f32, y: f32, width: f32, height: f32) -> Vec<(Point, bool)> {
        vec![
            self.point(x, y),
            self.point(x + width, y),
            self.point(x + width, y + height),
            self.point(x, y + height),
        ]
    }

    fn draw(&self, op: &DrawOp) {
        match op {
            DrawOp::FillRect {
                x,
                y,
                width,
                height,
                color,
            } => {
                self.layer.set_fill_color(pdf_color(*color));
                self.layer.add_polygon(Polygon {
                    rings: vec![self.rect_points(*x, *y, *width, *height)],
                    mode: PaintMode::Fill,
                    winding_order: WindingOrder::NonZero,
                });
            }
            DrawOp::StrokeRect {
                x,
                y,
                width,
                height,
                line_width,
                color,
            } => {
                self.layer.set_outline_color(pdf_color(*color));
                self.layer.set_outline_thickness(line_width * MM_TO_PT);
                self.layer.add_line(Line {
                    points: self.rect_points(*x, *y, *width, *height),
                    is_closed: true,
                });
            }
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                line_width,
                color,
            } => {
                self.layer.set_outline_color(pdf_color(*color));
                self.layer.set_outline_thickness(line_width * MM_TO_PT);
                self.layer.add_line(Line {
                    points: vec![self.point(*x1, *y1), self.point(*x2, *y2)],
                    is_closed: false,
                });
            }
            DrawOp::Text {
                text,
                x,
                y,
                size,
                style,
                color,
            } => {
                let dropped = unsupported_chars(text);
                if !dropped.is_empty() {
                    warn!(%text, %dropped, "characters outside WinAnsi are left out of the PDF");
                }
                self.layer.set_fill_color(pdf_color(*color));
                self.layer.use_text(
                    text.as_str(),
                    *size,
                    Mm(*x),
                    Mm(self.page_height - y),
                    self.fonts.get(*style),
                );
            }
        }
    }
}

/// Characters the builtin fonts' WinAnsi encoding cannot represent.
fn unsupported_chars(text: &str) -> String {
    text.chars().filter(|c| !is_winansi(*c)).collect()
}

fn is_winansi(c: char) -> bool {
    matches!(c, '\u{20}'..='\u{7E}' | '\u{A0}'..='\u{FF}')
        || "€‚ƒ„…†‡ˆ‰Š‹ŒŽ‘’“”•–—˜™š›œžŸ".contains(c)
}

fn pdf_color(color: layout::Color) -> Color {
    Color::Rgb(Rgb::new(
        color.r as f32 / 255.0,
        color.g as f32 / 255.0,
        color.b as f32 / 255.0,
        None,
    ))
}
