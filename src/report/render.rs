use super::{Block, Page, ReportError};

/// Rendu d'un document page par page.
///
/// Les pages sont ajoutées une à une, dans l'ordre ; un rendu PDF
/// implémenterait ce même trait avec l'extension `pdf`.
pub trait DocumentRenderer {
    fn extension(&self) -> &'static str;
    fn begin(&mut self, title: &str) -> Result<(), ReportError>;
    fn append_page(&mut self, page: &Page) -> Result<(), ReportError>;
    fn finish(&mut self) -> Result<Vec<u8>, ReportError>;
}

/// Rendu texte brut ; les pages sont séparées par un saut de page (`\x0c`).
#[derive(Debug, Default)]
pub struct TextRenderer {
    title: String,
    out: String,
    pages: usize,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentRenderer for TextRenderer {
    fn extension(&self) -> &'static str {
        "txt"
    }

    fn begin(&mut self, title: &str) -> Result<(), ReportError> {
        self.title = title.to_string();
        self.out.clear();
        self.pages = 0;
        Ok(())
    }

    fn append_page(&mut self, page: &Page) -> Result<(), ReportError> {
        if self.pages > 0 {
            self.out.push('\x0c');
            self.out.push('\n');
        }
        self.pages += 1;
        self.out
            .push_str(&format!("{} - Página {}\n\n", self.title, self.pages));
        for block in &page.blocks {
            render_block(&mut self.out, block);
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<Vec<u8>, ReportError> {
        if self.pages == 0 {
            return Err(ReportError::Render("document has no pages".into()));
        }
        Ok(std::mem::take(&mut self.out).into_bytes())
    }
}

fn render_block(out: &mut String, block: &Block) {
    match block {
        Block::Heading(text) => {
            out.push_str(text);
            out.push('\n');
            out.push_str(&"-".repeat(text.chars().count()));
            out.push_str("\n\n");
        }
        Block::Paragraph(text) => {
            out.push_str(text);
            out.push_str("\n\n");
        }
        Block::Bullets(items) => {
            for item in items {
                out.push_str("• ");
                out.push_str(item);
                out.push('\n');
            }
            out.push('\n');
        }
        Block::Table { headers, rows } => {
            out.push_str(&text_table(headers, rows));
            out.push('\n');
        }
        Block::Fields(fields) => {
            for (label, value) in fields {
                out.push_str(&format!("{label}: {value}\n"));
            }
            out.push('\n');
        }
        Block::Signature(image) => {
            let status = if image.is_some() {
                "[imagem anexada]"
            } else {
                "não coletada"
            };
            out.push_str(&format!("Assinatura do solicitante: {status}\n\n"));
        }
    }
}

/// Tableau aligné à gauche, colonnes séparées par ` | `.
pub fn text_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(w) => *w = (*w).max(len),
                None => widths.push(len),
            }
        }
    }

    let line = |cells: &[String]| -> String {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, &w)| {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                format!("{cell:<w$}")
            })
            .collect();
        padded.join(" | ").trim_end().to_string()
    };

    let mut out = line(headers);
    out.push('\n');
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&separator.join("-+-"));
    out.push('\n');
    for row in rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    out
}
