//! crates/fieldtest_core/src/report_doc.rs
//!
//! The printable test-report template.
//!
//! Composing a document is a pure function of the report, its company and the
//! stamp position. The result is a list of A4 pages holding positioned text,
//! rules and the stamp box, all in points with the origin at the top-left corner.
//! A `DocumentRenderer` turns it into bytes.

use crate::domain::{Company, HtBreakerReport, Measurement, OilReport, ReportHeader};
use chrono::NaiveDate;

pub const PAGE_WIDTH_PT: f32 = 595.28;
pub const PAGE_HEIGHT_PT: f32 = 841.89;

const MARGIN: f32 = 40.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH_PT - 2.0 * MARGIN;
const BODY_TOP: f32 = 118.0;
const BODY_BOTTOM: f32 = PAGE_HEIGHT_PT - 64.0;
const ROW_HEIGHT: f32 = 16.0;
const BODY_SIZE: f32 = 9.0;
const STAMP_SIZE_PX: f32 = 120.0;

/// Shown wherever the report leaves a field empty.
pub const MISSING: &str = "-";

//=========================================================================================
// Document Model
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Regular,
    Bold,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Text {
        x: f32,
        y: f32,
        size: f32,
        weight: Weight,
        text: String,
    },
    Rule {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    },
    Stamp {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        label: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocPage {
    pub elements: Vec<Element>,
}

impl DocPage {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|e| match e {
            Element::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub title: String,
    pub file_name: String,
    pub pages: Vec<DocPage>,
}

/// Where the stamp image sits, in CSS pixels from the top-left of the last page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StampOffset {
    pub x_px: f32,
    pub y_px: f32,
}

/// CSS pixels are 1/96 in, PDF points are 1/72 in.
pub fn px_to_pt(px: f32) -> f32 {
    px * 72.0 / 96.0
}

impl StampOffset {
    pub fn to_points(self) -> (f32, f32) {
        (px_to_pt(self.x_px), px_to_pt(self.y_px))
    }
}

//=========================================================================================
// Field Formatting
//=========================================================================================

fn show(value: &Option<String>) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => MISSING.to_string(),
    }
}

fn show_date(value: Option<NaiveDate>) -> String {
    value
        .map(|d| d.format("%d-%m-%Y").to_string())
        .unwrap_or_else(|| MISSING.to_string())
}

fn approx_chars(width: f32, size: f32) -> usize {
    ((width / (size * 0.5)).floor() as usize).max(1)
}

fn fit(text: &str, width: f32, size: f32) -> String {
    let max = approx_chars(width, size);
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max.saturating_sub(2)).collect();
        cut.push_str("..");
        cut
    }
}

/// Greedy word wrap on an approximate glyph width.
fn wrap(text: &str, width: f32, size: f32) -> Vec<String> {
    let max = approx_chars(width, size);
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > max {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    if lines.is_empty() {
        lines.push(MISSING.to_string());
    }
    lines
}

//=========================================================================================
// Composer
//=========================================================================================

struct Composer {
    title: String,
    subtitle: String,
    pages: Vec<DocPage>,
    y: f32,
}

impl Composer {
    fn new(title: &str, subtitle: String) -> Self {
        let mut composer = Self {
            title: title.to_string(),
            subtitle,
            pages: Vec::new(),
            y: BODY_TOP,
        };
        composer.new_page();
        composer
    }

    fn page(&mut self) -> &mut DocPage {
        // `new` always pushes the first page.
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn new_page(&mut self) {
        let mut page = DocPage::default();
        page.elements.push(Element::Text {
            x: MARGIN,
            y: 48.0,
            size: 15.0,
            weight: Weight::Bold,
            text: self.title.clone(),
        });
        page.elements.push(Element::Text {
            x: MARGIN,
            y: 68.0,
            size: 10.0,
            weight: Weight::Regular,
            text: self.subtitle.clone(),
        });
        page.elements.push(Element::Rule {
            x1: MARGIN,
            y1: 84.0,
            x2: PAGE_WIDTH_PT - MARGIN,
            y2: 84.0,
        });
        self.pages.push(page);
        self.y = BODY_TOP;
    }

    /// Starts a new page unless `height` more points fit on this one.
    fn ensure(&mut self, height: f32) -> bool {
        if self.y + height > BODY_BOTTOM {
            self.new_page();
            true
        } else {
            false
        }
    }

    fn text(&mut self, x: f32, size: f32, weight: Weight, text: String) {
        let y = self.y;
        self.page().elements.push(Element::Text {
            x,
            y,
            size,
            weight,
            text,
        });
    }

    fn rule(&mut self) {
        let y = self.y - ROW_HEIGHT + 4.0;
        self.page().elements.push(Element::Rule {
            x1: MARGIN,
            y1: y,
            x2: PAGE_WIDTH_PT - MARGIN,
            y2: y,
        });
    }

    fn heading(&mut self, text: &str) {
        self.ensure(ROW_HEIGHT * 3.0);
        self.y += 6.0;
        self.text(MARGIN, 11.0, Weight::Bold, text.to_string());
        self.y += ROW_HEIGHT;
    }

    /// Label/value pairs laid out two per row.
    fn grid(&mut self, pairs: &[(&str, String)]) {
        let half = CONTENT_WIDTH / 2.0;
        for chunk in pairs.chunks(2) {
            self.ensure(ROW_HEIGHT);
            for (i, (label, value)) in chunk.iter().enumerate() {
                let x = MARGIN + half * i as f32;
                self.text(x, BODY_SIZE, Weight::Bold, format!("{}:", label));
                self.text(
                    x + 110.0,
                    BODY_SIZE,
                    Weight::Regular,
                    fit(value, half - 115.0, BODY_SIZE),
                );
            }
            self.y += ROW_HEIGHT;
        }
    }

    fn table_row(&mut self, widths: &[f32], cells: &[String], weight: Weight) {
        let mut x = MARGIN;
        for (width, cell) in widths.iter().zip(cells) {
            let w = width * CONTENT_WIDTH;
            self.text(x + 2.0, BODY_SIZE, weight, fit(cell, w - 4.0, BODY_SIZE));
            x += w;
        }
        self.y += ROW_HEIGHT;
        self.rule();
    }

    /// A table whose header row repeats on every page it spills onto.
    /// `widths` are fractions of the content width.
    fn table(&mut self, headers: &[&str], widths: &[f32], rows: &[Vec<String>]) {
        let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        self.ensure(ROW_HEIGHT * 2.0);
        self.table_row(widths, &header_cells, Weight::Bold);
        for row in rows {
            if self.ensure(ROW_HEIGHT) {
                self.table_row(widths, &header_cells, Weight::Bold);
            }
            self.table_row(widths, row, Weight::Regular);
        }
    }

    fn paragraph(&mut self, label: &str, text: &Option<String>) {
        self.heading(label);
        for line in wrap(&show(text), CONTENT_WIDTH, BODY_SIZE) {
            self.ensure(ROW_HEIGHT);
            self.text(MARGIN, BODY_SIZE, Weight::Regular, line);
            self.y += ROW_HEIGHT;
        }
    }

    fn finish(mut self, file_name: String, stamp: StampOffset, stamp_label: String) -> ReportDocument {
        let (x, y) = stamp.to_points();
        let side = px_to_pt(STAMP_SIZE_PX);
        self.page().elements.push(Element::Stamp {
            x,
            y,
            width: side,
            height: side,
            label: stamp_label,
        });

        let total = self.pages.len();
        for (i, page) in self.pages.iter_mut().enumerate() {
            page.elements.push(Element::Text {
                x: PAGE_WIDTH_PT - MARGIN - 70.0,
                y: PAGE_HEIGHT_PT - 30.0,
                size: 8.0,
                weight: Weight::Regular,
                text: format!("Page {} of {}", i + 1, total),
            });
        }

        ReportDocument {
            title: self.title,
            file_name,
            pages: self.pages,
        }
    }
}

fn customer_block(composer: &mut Composer, company: Option<&Company>, header: &ReportHeader) {
    composer.heading("Customer");
    composer.grid(&[
        ("Company", company.map(|c| c.name.clone()).unwrap_or_else(|| MISSING.into())),
        ("Address", company.map(|c| c.address.clone()).unwrap_or_else(|| MISSING.into())),
        ("Report No", show(&header.report_no)),
        ("Report Date", show_date(header.report_date)),
        ("Next Due Date", show_date(header.next_due_date)),
    ]);
}

fn subtitle(header: &ReportHeader) -> String {
    format!(
        "Report No: {}    Date: {}",
        show(&header.report_no),
        show_date(header.report_date)
    )
}

const STAMP_LABEL: &str = "Authorised Signatory";

//=========================================================================================
// Templates
//=========================================================================================

/// Lays out a transformer oil filtration report.
pub fn oil_report_document(
    report: &OilReport,
    company: Option<&Company>,
    stamp: StampOffset,
) -> ReportDocument {
    let mut composer = Composer::new("TRANSFORMER OIL FILTRATION REPORT", subtitle(&report.header));
    customer_block(&mut composer, company, &report.header);

    composer.heading("Equipment");
    composer.grid(&[
        ("Equipment", show(&report.equipment)),
        ("Make", show(&report.make)),
        ("Serial No", show(&report.serial_no)),
        ("Rating (kVA)", show(&report.rating_kva)),
        ("Voltage Ratio", show(&report.voltage_ratio)),
        ("Location", show(&report.location)),
        ("Oil Quantity", show(&report.oil_quantity)),
    ]);

    composer.heading("Test Results");
    let rows: Vec<Vec<String>> = report
        .measurements
        .rows()
        .iter()
        .enumerate()
        .map(|(i, (parameter, unit, limit, reading))| {
            let Measurement { before, after } = reading;
            vec![
                (i + 1).to_string(),
                parameter.to_string(),
                if unit.is_empty() { MISSING.to_string() } else { unit.to_string() },
                limit.to_string(),
                show(before),
                show(after),
            ]
        })
        .collect();
    composer.table(
        &["S.No", "Parameter", "Unit", "Limit", "Before", "After"],
        &[0.07, 0.29, 0.16, 0.16, 0.16, 0.16],
        &rows,
    );

    composer.paragraph("Remarks", &report.remarks);

    composer.finish(
        format!("oil-report-{}.pdf", report.header.id),
        stamp,
        STAMP_LABEL.to_string(),
    )
}

/// Lays out a high-tension breaker test report, one table per measurement section.
pub fn ht_breaker_document(
    report: &HtBreakerReport,
    company: Option<&Company>,
    stamp: StampOffset,
) -> ReportDocument {
    let mut composer = Composer::new("HT BREAKER TEST REPORT", subtitle(&report.header));
    customer_block(&mut composer, company, &report.header);

    composer.heading("Breaker Details");
    composer.grid(&[
        ("Make", show(&report.make)),
        ("Type", show(&report.breaker_type)),
        ("Serial No", show(&report.serial_no)),
        ("Rated Voltage", show(&report.rated_voltage)),
        ("Rated Current", show(&report.rated_current)),
        ("Breaking Capacity", show(&report.breaking_capacity)),
        ("Panel", show(&report.panel)),
        ("Location", show(&report.location)),
    ]);

    for section in &report.sections {
        composer.heading(if section.title.trim().is_empty() {
            MISSING
        } else {
            section.title.trim()
        });
        let rows: Vec<Vec<String>> = section
            .subrows
            .iter()
            .map(|row| {
                vec![
                    if row.description.trim().is_empty() {
                        MISSING.to_string()
                    } else {
                        row.description.clone()
                    },
                    show(&row.r),
                    show(&row.y),
                    show(&row.b),
                ]
            })
            .collect();
        composer.table(&["Description", "R", "Y", "B"], &[0.46, 0.18, 0.18, 0.18], &rows);
    }

    composer.paragraph("Remarks", &report.remarks);

    composer.finish(
        format!("ht-breaker-report-{}.pdf", report.header.id),
        stamp,
        STAMP_LABEL.to_string(),
    )
}
