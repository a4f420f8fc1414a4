//! services/console/src/adapters/pdf.rs
//!
//! Draws a laid-out `ReportDocument` with printpdf, the concrete implementation
//! of the `DocumentRenderer` port. The document model uses points from the top-left
//! corner; PDF pages measure from the bottom-left, so every y is flipped here.

use fieldtest_core::ports::{DocumentRenderer, PortError, PortResult};
use fieldtest_core::report_doc::{Element, ReportDocument, Weight, PAGE_HEIGHT_PT, PAGE_WIDTH_PT};
use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Point,
};
use tracing::debug;

use crate::error::ConsoleError;

fn pt_to_mm(pt: f32) -> f32 {
    pt * 25.4 / 72.0
}

/// x in points from the left edge.
fn x_mm(x: f32) -> Mm {
    Mm(pt_to_mm(x))
}

/// y in points from the top edge, flipped to PDF's bottom-left origin.
fn y_mm(y: f32) -> Mm {
    Mm(pt_to_mm(PAGE_HEIGHT_PT - y))
}

fn line(points: &[(f32, f32)], closed: bool) -> Line {
    Line {
        points: points
            .iter()
            .map(|&(x, y)| (Point::new(x_mm(x), y_mm(y)), false))
            .collect(),
        is_closed: closed,
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self, ConsoleError> {
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ConsoleError::Pdf(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ConsoleError::Pdf(e.to_string()))?;
        Ok(Self { regular, bold })
    }

    fn get(&self, weight: Weight) -> &IndirectFontRef {
        match weight {
            Weight::Regular => &self.regular,
            Weight::Bold => &self.bold,
        }
    }
}

fn draw(layer: &PdfLayerReference, fonts: &Fonts, element: &Element) {
    match element {
        Element::Text {
            x,
            y,
            size,
            weight,
            text,
        } => {
            layer.use_text(text.as_str(), *size, x_mm(*x), y_mm(*y), fonts.get(*weight));
        }
        Element::Rule { x1, y1, x2, y2 } => {
            layer.set_outline_thickness(0.5);
            layer.add_line(line(&[(*x1, *y1), (*x2, *y2)], false));
        }
        Element::Stamp {
            x,
            y,
            width,
            height,
            label,
        } => {
            layer.set_outline_thickness(1.2);
            layer.add_line(line(
                &[
                    (*x, *y),
                    (*x + *width, *y),
                    (*x + *width, *y + *height),
                    (*x, *y + *height),
                ],
                true,
            ));
            layer.use_text(
                label.as_str(),
                8.0,
                x_mm(*x + 6.0),
                y_mm(*y + *height / 2.0),
                &fonts.bold,
            );
        }
    }
}

/// Renders report documents as A4 PDFs using the built-in Helvetica faces.
#[derive(Clone, Default)]
pub struct PrintPdfRenderer;

impl PrintPdfRenderer {
    pub fn new() -> Self {
        Self
    }

    fn render_pdf(&self, document: &ReportDocument) -> Result<Vec<u8>, ConsoleError> {
        let width = Mm(pt_to_mm(PAGE_WIDTH_PT));
        let height = Mm(pt_to_mm(PAGE_HEIGHT_PT));
        let (doc, first_page, first_layer) =
            PdfDocument::new(document.title.as_str(), width, height, "Page 1");
        let fonts = Fonts::load(&doc)?;

        for (i, page) in document.pages.iter().enumerate() {
            let layer = if i == 0 {
                doc.get_page(first_page).get_layer(first_layer)
            } else {
                let (page_index, layer_index) =
                    doc.add_page(width, height, format!("Page {}", i + 1));
                doc.get_page(page_index).get_layer(layer_index)
            };
            for element in &page.elements {
                draw(&layer, &fonts, element);
            }
        }

        let bytes = doc
            .save_to_bytes()
            .map_err(|e| ConsoleError::Pdf(e.to_string()))?;
        debug!(
            "Rendered '{}' ({} pages, {} bytes)",
            document.file_name,
            document.pages.len(),
            bytes.len()
        );
        Ok(bytes)
    }
}

impl DocumentRenderer for PrintPdfRenderer {
    fn render(&self, document: &ReportDocument) -> PortResult<Vec<u8>> {
        self.render_pdf(document).map_err(PortError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldtest_core::domain::OilReport;
    use fieldtest_core::report_doc::{oil_report_document, StampOffset};

    #[test]
    fn renders_a_pdf_header() {
        let document = oil_report_document(
            &OilReport::default(),
            None,
            StampOffset {
                x_px: 420.0,
                y_px: 160.0,
            },
        );
        let bytes = PrintPdfRenderer::new().render(&document).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn y_axis_is_flipped() {
        assert_eq!(y_mm(PAGE_HEIGHT_PT).0, 0.0);
        assert!((x_mm(72.0).0 - 25.4).abs() < 1e-4);
    }
}
