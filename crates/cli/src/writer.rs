//! Result table output
//!
//! Tab-separated file with a `cit1 cit2 probability quantity` header, plus
//! an aligned text preview for the terminal.

use citeorder_analysis::ResultRow;
use citeorder_common::errors::Result;
use csv::WriterBuilder;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

const BOM: &[u8] = "\u{feff}".as_bytes();

/// Write rows as TSV to any sink
pub fn write_rows<W: Write>(mut sink: W, rows: &[ResultRow], write_bom: bool) -> Result<()> {
    if write_bom {
        sink.write_all(BOM)?;
    }

    let mut writer = WriterBuilder::new().delimiter(b'\t').from_writer(sink);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Write rows as TSV to a file, replacing it
pub fn write_table(path: &Path, rows: &[ResultRow], write_bom: bool) -> Result<()> {
    let file = File::create(path)?;
    write_rows(BufWriter::new(file), rows, write_bom)?;

    debug!(path = %path.display(), rows = rows.len(), "Result table written");
    Ok(())
}

/// Render rows as a left-aligned text table
pub fn render_preview(rows: &[ResultRow]) -> String {
    let header = ["cit1", "cit2", "probability", "quantity"];
    let cells: Vec<[String; 4]> = rows
        .iter()
        .map(|r| {
            [
                r.item_first.clone(),
                r.item_second.clone(),
                format!("{:.4}", r.probability),
                r.quantity.to_string(),
            ]
        })
        .collect();

    let mut widths = header.map(|h| h.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let mut push_line = |values: [&str; 4]| {
        let line: Vec<String> = values
            .iter()
            .zip(widths.iter())
            .map(|(v, w)| format!("{}{}", v, " ".repeat(w - v.chars().count())))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    };

    push_line(header);
    for row in &cells {
        push_line([row[0].as_str(), row[1].as_str(), row[2].as_str(), row[3].as_str()]);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<ResultRow> {
        vec![
            ResultRow { item_first: "A".into(), item_second: "B".into(), probability: 0.6667, quantity: 3 },
            ResultRow { item_first: "B".into(), item_second: "A".into(), probability: 0.3333, quantity: 3 },
            ResultRow { item_first: "C".into(), item_second: "D".into(), probability: 1.0, quantity: 2 },
        ]
    }

    #[test]
    fn test_write_rows_tsv() {
        let mut buf = Vec::new();
        write_rows(&mut buf, &rows(), false).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "cit1\tcit2\tprobability\tquantity");
        assert_eq!(lines[1], "A\tB\t0.6667\t3");
        assert_eq!(lines[2], "B\tA\t0.3333\t3");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_write_rows_with_bom() {
        let mut buf = Vec::new();
        write_rows(&mut buf, &rows(), true).unwrap();

        assert!(buf.starts_with(BOM));
    }

    #[test]
    fn test_write_table_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cit_pair_analysis.txt");

        write_table(&path, &rows(), true).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with('\u{feff}'));
        assert!(written.contains("C\tD\t"));
    }

    #[test]
    fn test_render_preview_alignment() {
        let preview = render_preview(&rows()[..2]);
        let lines: Vec<&str> = preview.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "cit1  cit2  probability  quantity");
        assert_eq!(lines[1], "A     B     0.6667       3");
    }
}
