//! Output formatting for search results

use crate::index::types::FileRecord;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One record per line: path, size in bytes
    #[default]
    Plain,
    /// A JSON array of records
    Json,
}

/// Print records to stdout, sorted by path
pub fn print_records(records: &[FileRecord], format: OutputFormat, color: bool) -> io::Result<()> {
    let choice = if color && format == OutputFormat::Plain {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);
    write_records(&mut stdout, records, format)
}

/// Write records to any color-aware sink, sorted by path
pub fn write_records<W: WriteColor>(out: &mut W, records: &[FileRecord], format: OutputFormat) -> io::Result<()> {
    let mut sorted: Vec<&FileRecord> = records.iter().collect();
    sorted.sort_by(|a, b| a.path.cmp(&b.path));

    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &sorted)?;
            writeln!(out)?;
        }
        OutputFormat::Plain => {
            for record in sorted {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
                write!(out, "{}", record.path.display())?;
                out.reset()?;
                write!(out, "\t")?;
                out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
                write!(out, "{}", record.size_bytes)?;
                out.reset()?;
                writeln!(out)?;
            }
        }
    }

    Ok(())
}
