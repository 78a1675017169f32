/*!
Export of a document to JSON, HTML and PDF.

JSON and HTML are produced here. PDF output needs a rasterizing renderer, which
is plugged in through [`PdfRenderer`]; without one the format is reported as
unsupported.
*/

use crate::document::Document;
use crate::{CvError, Result};
use chrono::{Datelike, NaiveDate};
use std::fmt::{self, Write as _};
use std::str::FromStr;
use tracing::debug;

/// Scale factor applied when capturing the rendered page for PDF output
pub const PDF_CAPTURE_SCALE: f64 = 3.0;

const FRENCH_MONTHS: [&str; 12] = [
    "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.", "nov.",
    "déc.",
];

/// Supported export targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Pdf,
    Html,
    Json,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Pdf, ExportFormat::Html, ExportFormat::Json];

    pub fn id(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Html => "html",
            ExportFormat::Json => "json",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "PDF",
            ExportFormat::Html => "HTML",
            ExportFormat::Json => "JSON",
        }
    }

    /// Download file name for this format
    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "cv.pdf",
            ExportFormat::Html => "cv.html",
            ExportFormat::Json => "cv.json",
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Html => "text/html",
            ExportFormat::Json => "application/json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ExportFormat {
    type Err = CvError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "html" => Ok(ExportFormat::Html),
            "json" => Ok(ExportFormat::Json),
            other => Err(CvError::unsupported_format(format!(
                "Format d'export non supporté: {other}"
            ))),
        }
    }
}

/// Page geometry handed to a PDF renderer, in millimetres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_mm: f64,
    pub height_mm: f64,
    pub capture_scale: f64,
}

impl PageGeometry {
    /// A4 portrait at the default capture scale
    pub const A4_PORTRAIT: PageGeometry = PageGeometry {
        width_mm: 210.0,
        height_mm: 297.0,
        capture_scale: PDF_CAPTURE_SCALE,
    };

    /// Height in millimetres of a captured image of `pixel_width` x
    /// `pixel_height` once stretched to the page width.
    ///
    /// The result can exceed the page height; the image is not split across
    /// pages.
    pub fn fitted_image_height(&self, pixel_width: u32, pixel_height: u32) -> f64 {
        if pixel_width == 0 {
            return 0.0;
        }
        f64::from(pixel_height) * self.width_mm / f64::from(pixel_width)
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4_PORTRAIT
    }
}

/// Rasterizes rendered HTML into PDF bytes
pub trait PdfRenderer: Send + Sync {
    fn render(&self, html: &str, geometry: &PageGeometry) -> Result<Vec<u8>>;
}

/// Output of one export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub file_name: &'static str,
    pub media_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    fn new(format: ExportFormat, bytes: Vec<u8>) -> Self {
        Self {
            format,
            file_name: format.file_name(),
            media_type: format.media_type(),
            bytes,
        }
    }
}

/// Dispatches a document to the requested export format
#[derive(Default)]
pub struct Exporter {
    pdf: Option<Box<dyn PdfRenderer>>,
    geometry: PageGeometry,
}

impl Exporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pdf_renderer<R: PdfRenderer + 'static>(mut self, renderer: R) -> Self {
        self.pdf = Some(Box::new(renderer));
        self
    }

    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn supports(&self, format: ExportFormat) -> bool {
        format != ExportFormat::Pdf || self.pdf.is_some()
    }

    pub fn export(&self, format: ExportFormat, document: &Document) -> Result<ExportArtifact> {
        let bytes = match format {
            ExportFormat::Json => export_json(document)?.into_bytes(),
            ExportFormat::Html => render_html(document).into_bytes(),
            ExportFormat::Pdf => {
                let renderer = self.pdf.as_ref().ok_or_else(|| {
                    CvError::unsupported_format("PDF export requires a renderer")
                })?;
                renderer.render(&render_html(document), &self.geometry)?
            }
        };

        debug!(%format, bytes = bytes.len(), "Exported document");
        Ok(ExportArtifact::new(format, bytes))
    }
}

impl fmt::Debug for Exporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exporter")
            .field("pdf", &self.pdf.is_some())
            .field("geometry", &self.geometry)
            .finish()
    }
}

/// Pretty-printed JSON dump of the document
pub fn export_json(document: &Document) -> Result<String> {
    Ok(serde_json::to_string_pretty(document)?)
}

/// Format an ISO date as `DD Mon YYYY` with French abbreviated months.
///
/// Empty input gives an empty string. Input that is not a date is returned
/// unchanged.
pub fn format_date_fr(date: &str) -> String {
    let date = date.trim();
    if date.is_empty() {
        return String::new();
    }

    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").or_else(|_| {
        // Accept full timestamps and keep only the date part
        date.get(..10)
            .ok_or(())
            .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").map_err(|_| ()))
    });

    match parsed {
        Ok(day) => format!(
            "{:02} {} {}",
            day.day(),
            FRENCH_MONTHS[day.month0() as usize],
            day.year()
        ),
        Err(_) => date.to_string(),
    }
}

/// Escape text for inclusion in HTML content or attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const HTML_STYLE: &str = r#"        body {
            font-family: Arial, sans-serif;
            line-height: 1.6;
            max-width: 800px;
            margin: 0 auto;
            padding: 20px;
        }
        .section {
            margin-bottom: 20px;
        }
        .section-title {
            color: #2563eb;
            border-bottom: 2px solid #2563eb;
            margin-bottom: 10px;
        }
        .item {
            margin-bottom: 15px;
        }
        .item-title {
            font-weight: bold;
        }
        .item-subtitle {
            color: #666;
        }
"#;

/// Render the document as a standalone French HTML page
pub fn render_html(document: &Document) -> String {
    let details = &document.personal_details;
    let e = escape_html;
    let mut html = String::with_capacity(4096);

    // Writing into a String cannot fail
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"fr\">\n<head>\n    <meta charset=\"UTF-8\">\n    \
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n    \
         <title>CV - {}</title>\n    <style>\n{}    </style>\n</head>\n<body>\n",
        e(&details.full_name),
        HTML_STYLE
    );

    let _ = write!(
        html,
        "    <div class=\"section\">\n        <h1>{}</h1>\n        <p>{}</p>\n        <p>{}</p>\n        \
         <p>Email: {}</p>\n        <p>Téléphone: {}</p>\n        <p>Adresse: {}</p>\n    </div>\n",
        e(&details.full_name),
        e(&details.post_seeking),
        e(&details.description),
        e(&details.email),
        e(&details.phone),
        e(&details.address),
    );

    open_section(&mut html, "Expériences Professionnelles");
    for exp in &document.experiences {
        push_item(
            &mut html,
            &exp.job_title,
            &exp.company_name,
            &exp.start_date,
            &exp.end_date,
            &exp.description,
        );
    }
    close_section(&mut html);

    open_section(&mut html, "Formation");
    for edu in &document.educations {
        push_item(
            &mut html,
            &edu.degree,
            &edu.school,
            &edu.start_date,
            &edu.end_date,
            &edu.description,
        );
    }
    close_section(&mut html);

    open_section(&mut html, "Compétences");
    let skills: Vec<String> = document
        .skills
        .iter()
        .map(|skill| format!("<span class=\"skill\">{}</span>", e(&skill.name)))
        .collect();
    let _ = writeln!(
        html,
        "        <div class=\"skills\">{}</div>",
        skills.join(", ")
    );
    close_section(&mut html);

    open_section(&mut html, "Langues");
    for lang in &document.languages {
        let _ = writeln!(
            html,
            "        <div class=\"item\"><span class=\"item-title\">{}</span> - <span>{}</span></div>",
            e(&lang.language),
            e(&lang.proficiency)
        );
    }
    close_section(&mut html);

    open_section(&mut html, "Centres d'intérêt");
    let hobbies: Vec<String> = document.hobbies.iter().map(|h| e(&h.name)).collect();
    let _ = writeln!(html, "        <div>{}</div>", hobbies.join(", "));
    close_section(&mut html);

    html.push_str("</body>\n</html>\n");
    html
}

fn open_section(html: &mut String, title: &str) {
    let _ = writeln!(
        html,
        "    <div class=\"section\">\n        <h2 class=\"section-title\">{}</h2>",
        escape_html(title)
    );
}

fn close_section(html: &mut String) {
    html.push_str("    </div>\n");
}

fn push_item(
    html: &mut String,
    title: &str,
    subtitle: &str,
    start: &str,
    end: &str,
    description: &str,
) {
    let _ = writeln!(
        html,
        "        <div class=\"item\">\n            <div class=\"item-title\">{}</div>\n            \
         <div class=\"item-subtitle\">{}</div>\n            <div>{} - {}</div>\n            \
         <p>{}</p>\n        </div>",
        escape_html(title),
        escape_html(subtitle),
        escape_html(&format_date_fr(start)),
        escape_html(&format_date_fr(end)),
        escape_html(description)
    );
}
