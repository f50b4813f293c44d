//! Document renderers
//!
//! Both renderers write `RFP_<millis>.<ext>` into an output directory and
//! return the file path as the document reference. Existing files are never
//! overwritten; a numeric suffix is added instead.

use chrono::Utc;
use printpdf::{BuiltinFont, Mm, PdfDocument};
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tenderline_domain::traits::DocumentRenderer;
use tenderline_domain::RenderError;
use tracing::debug;

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const MARGIN: f32 = 20.0;
const FONT_SIZE: f32 = 10.0;
const LINE_HEIGHT: f32 = 5.0;

// Characters per line at the body font size
const PDF_LINE_CHARS: usize = 95;

fn io_error(path: &Path, e: std::io::Error) -> RenderError {
    RenderError::Io(format!("{}: {}", path.display(), e))
}

/// Create a fresh `RFP_<millis>.<ext>` file in `dir`
fn create_unique(dir: &Path, extension: &str) -> Result<(File, PathBuf), RenderError> {
    std::fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;

    let millis = Utc::now().timestamp_millis();
    let mut attempt = 0u32;
    loop {
        let name = match attempt {
            0 => format!("RFP_{}.{}", millis, extension),
            n => format!("RFP_{}_{}.{}", millis, n, extension),
        };
        let path = dir.join(name);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((file, path)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(io_error(&path, e)),
        }
    }
}

fn write_document(dir: &Path, extension: &str, bytes: &[u8]) -> Result<String, RenderError> {
    let (mut file, path) = create_unique(dir, extension)?;
    file.write_all(bytes).map_err(|e| io_error(&path, e))?;
    debug!(path = %path.display(), bytes = bytes.len(), "document rendered");
    Ok(path.to_string_lossy().into_owned())
}

/// Writes each document as plain UTF-8 text to `RFP_<millis>.txt`
#[derive(Debug, Clone)]
pub struct TextFileRenderer {
    dir: PathBuf,
}

impl TextFileRenderer {
    /// Render into `dir`, created on first use
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl DocumentRenderer for TextFileRenderer {
    fn render(&self, text: &str) -> Result<String, RenderError> {
        write_document(&self.dir, "txt", text.as_bytes())
    }
}

/// Lays each document out on A4 pages and writes `RFP_<millis>.pdf`
///
/// Text is set in the built-in Helvetica face, wrapped at word boundaries.
/// Characters outside printable ASCII are shown as `?`.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    dir: PathBuf,
    title: String,
}

impl PdfRenderer {
    /// Render into `dir`, created on first use
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            title: "Request for Proposal".to_string(),
        }
    }

    fn layout(&self, text: &str) -> Result<Vec<u8>, RenderError> {
        let pdf_error = |e: printpdf::Error| RenderError::Io(format!("pdf: {}", e));

        let (doc, first_page, first_layer) =
            PdfDocument::new(&self.title, PAGE_WIDTH, PAGE_HEIGHT, "Body");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_error)?;

        let top = PAGE_HEIGHT.0 - MARGIN;
        let mut layer = doc.get_page(first_page).get_layer(first_layer);
        let mut y = top;

        for line in wrap_lines(text, PDF_LINE_CHARS) {
            if y < MARGIN {
                let (page, body) = doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "Body");
                layer = doc.get_page(page).get_layer(body);
                y = top;
            }
            if !line.is_empty() {
                layer.use_text(line, FONT_SIZE, Mm(MARGIN), Mm(y), &font);
            }
            y -= LINE_HEIGHT;
        }

        doc.save_to_bytes().map_err(pdf_error)
    }
}

impl DocumentRenderer for PdfRenderer {
    fn render(&self, text: &str) -> Result<String, RenderError> {
        let bytes = self.layout(text)?;
        write_document(&self.dir, "pdf", &bytes)
    }
}

/// Split `text` into display lines of at most `width` characters
///
/// Paragraph breaks are kept as empty lines. Words longer than `width` are
/// split.
fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let word: String = word.chars().map(printable).collect();
            let mut rest = word.as_str();

            while rest.chars().count() > width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let split = rest
                    .char_indices()
                    .nth(width)
                    .map(|(i, _)| i)
                    .unwrap_or(rest.len());
                lines.push(rest[..split].to_string());
                rest = &rest[split..];
            }

            let needed = if current.is_empty() {
                rest.chars().count()
            } else {
                current.chars().count() + 1 + rest.chars().count()
            };
            if needed > width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(rest);
        }
        lines.push(current);
    }

    lines
}

fn printable(c: char) -> char {
    if c.is_ascii_graphic() || c == ' ' {
        c
    } else {
        '?'
    }
}
