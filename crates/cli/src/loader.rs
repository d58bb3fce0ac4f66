//! Corpus loading
//!
//! Reads a document table (one row per document) from CSV or TSV and
//! hands the content column to the analyzer.

use citeorder_common::config::IoConfig;
use citeorder_common::errors::{AppError, Result};
use csv::ReaderBuilder;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Supported input table formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusFormat {
    Csv,
    Tsv,
}

impl CorpusFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(CorpusFormat::Csv),
            "tsv" | "txt" => Ok(CorpusFormat::Tsv),
            _ => Err(AppError::UnsupportedFormat {
                extension: if extension.is_empty() { "(none)".to_string() } else { format!(".{}", extension) },
            }),
        }
    }

    fn delimiter(&self) -> u8 {
        match self {
            CorpusFormat::Csv => b',',
            CorpusFormat::Tsv => b'\t',
        }
    }
}

/// One row of the input table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Source work the row belongs to, when the table has a `book` column
    pub book: Option<String>,
    /// Document text; `None` for an empty cell
    pub content: Option<String>,
}

/// All documents of an input table, in file order
#[derive(Debug, Clone)]
pub struct Corpus {
    pub format: CorpusFormat,
    pub documents: Vec<Document>,
}

impl Corpus {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Content cells in row order
    pub fn texts(&self) -> impl Iterator<Item = Option<&str>> {
        self.documents.iter().map(|d| d.content.as_deref())
    }
}

/// Load a corpus file, validating its header
pub fn load_corpus(path: &Path, io: &IoConfig) -> Result<Corpus> {
    if !path.exists() {
        return Err(AppError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let format = CorpusFormat::from_path(path)?;
    let raw = std::fs::read_to_string(path)?;
    let text = raw.strip_prefix('\u{feff}').unwrap_or(&raw);

    let corpus = parse_corpus(text, format, io)?;

    let books: HashSet<&str> = corpus.documents.iter().filter_map(|d| d.book.as_deref()).collect();
    info!(
        path = %path.display(),
        rows = corpus.len(),
        books = books.len(),
        format = ?corpus.format,
        "Corpus loaded"
    );

    Ok(corpus)
}

/// Parse an in-memory table
pub fn parse_corpus(text: &str, format: CorpusFormat, io: &IoConfig) -> Result<Corpus> {
    let mut reader = ReaderBuilder::new()
        .delimiter(format.delimiter())
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let column = |name: &str| headers.iter().position(|h| h == name);

    for required in io.required_columns.iter().chain(std::iter::once(&io.content_column)) {
        if column(required).is_none() {
            return Err(AppError::MissingColumn {
                column: required.clone(),
            });
        }
    }

    let content_idx = column(&io.content_column).ok_or_else(|| AppError::MissingColumn {
        column: io.content_column.clone(),
    })?;
    let book_idx = column("book");

    let mut documents = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cell = |idx: usize| record.get(idx).filter(|v| !v.is_empty()).map(str::to_string);

        documents.push(Document {
            book: book_idx.and_then(cell),
            content: cell(content_idx),
        });
    }

    debug!(columns = headers.len(), rows = documents.len(), "Table parsed");

    Ok(Corpus { format, documents })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_format_detection() {
        assert_eq!(CorpusFormat::from_path(Path::new("a.csv")).unwrap(), CorpusFormat::Csv);
        assert_eq!(CorpusFormat::from_path(Path::new("a.TSV")).unwrap(), CorpusFormat::Tsv);
        assert_eq!(CorpusFormat::from_path(Path::new("cleaned_data.txt")).unwrap(), CorpusFormat::Tsv);

        let err = CorpusFormat::from_path(Path::new("a.xlsx")).unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat { ref extension } if extension == ".xlsx"));
        assert!(CorpusFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_parse_tsv() {
        let text = "book\tcontent\n論語\t〚孔子〛 《詩》\n孟子\t\n";
        let corpus = parse_corpus(text, CorpusFormat::Tsv, &IoConfig::default()).unwrap();

        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.documents[0].book.as_deref(), Some("論語"));
        assert_eq!(corpus.documents[0].content.as_deref(), Some("〚孔子〛 《詩》"));
        assert_eq!(corpus.documents[1].content, None);
    }

    #[test]
    fn test_parse_csv_with_quoted_commas() {
        let text = "id,book,content\n1,A,\"《X》, then 《Y》\"\n";
        let corpus = parse_corpus(text, CorpusFormat::Csv, &IoConfig::default()).unwrap();

        let texts: Vec<Option<&str>> = corpus.texts().collect();
        assert_eq!(texts, vec![Some("《X》, then 《Y》")]);
    }

    #[test]
    fn test_missing_column() {
        let err = parse_corpus("book\ttext\nA\tB\n", CorpusFormat::Tsv, &IoConfig::default()).unwrap_err();
        assert!(matches!(err, AppError::MissingColumn { ref column } if column == "content"));
    }

    #[test]
    fn test_load_strips_bom_and_reports_missing_file() {
        let mut file = tempfile::Builder::new().suffix(".tsv").tempfile().unwrap();
        write!(file, "\u{feff}book\tcontent\nA\t《X》《Y》\n").unwrap();

        let corpus = load_corpus(file.path(), &IoConfig::default()).unwrap();
        assert_eq!(corpus.format, CorpusFormat::Tsv);
        assert_eq!(corpus.documents[0].content.as_deref(), Some("《X》《Y》"));

        let err = load_corpus(Path::new("/nonexistent/corpus.tsv"), &IoConfig::default()).unwrap_err();
        assert!(matches!(err, AppError::FileNotFound { .. }));
    }
}
