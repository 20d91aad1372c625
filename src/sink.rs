//! Dataset persistence: CSV (default) and JSONL.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use crate::context::HarvestContext;
use crate::harvest::record::{Clarity, Color, Cut, Record};

/// Dataset output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    Csv,
    Jsonl,
}

impl ExportFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Jsonl => "jsonl",
        }
    }
}

/// Column order of the tabular output.
const COLUMNS: &[&str] = &[
    "id",
    "shape",
    "price",
    "carat",
    "cut",
    "color",
    "clarity",
    "report",
    "url",
    "category",
    "date_fetched",
];

/// Write the dataset and return its path. The filename carries the run
/// label; `price_window` adds the `min-max` suffix the bounded
/// single-category flow has always used.
pub fn write_dataset(
    context: &HarvestContext,
    records: &[Record],
    format: ExportFormat,
    price_window: Option<(u32, u32)>,
) -> io::Result<PathBuf> {
    let path = dataset_path(context, format, price_window);
    let file = File::create(&path)?;
    let mut out = BufWriter::new(file);
    match format {
        ExportFormat::Csv => write_csv(&mut out, records)?,
        ExportFormat::Jsonl => write_jsonl(&mut out, records)?,
    }
    out.flush()?;
    Ok(path)
}

fn dataset_path(
    context: &HarvestContext,
    format: ExportFormat,
    price_window: Option<(u32, u32)>,
) -> PathBuf {
    let name = match price_window {
        Some((min, max)) => format!(
            "{} {}-{}.{}",
            context.run_label(),
            min,
            max,
            format.extension()
        ),
        None => format!("{}.{}", context.run_label(), format.extension()),
    };
    context.data_dir.join(name)
}

fn write_csv(out: &mut impl Write, records: &[Record]) -> io::Result<()> {
    writeln!(out, "{}", COLUMNS.join(","))?;
    for record in records {
        let fields = [
            escape_csv(&record.identity),
            escape_csv(&record.shape),
            record.price.to_string(),
            record.carat.map(|c| c.to_string()).unwrap_or_default(),
            record.cut.map(Cut::label).unwrap_or_default().to_string(),
            record
                .color
                .map(Color::label)
                .unwrap_or_default()
                .to_string(),
            record
                .clarity
                .map(Clarity::label)
                .unwrap_or_default()
                .to_string(),
            record
                .report
                .as_deref()
                .map(escape_csv)
                .unwrap_or_default(),
            escape_csv(&record.reference_url),
            escape_csv(&record.category),
            record.fetched_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ];
        writeln!(out, "{}", fields.join(","))?;
    }
    Ok(())
}

/// Quote a field when it carries a separator, a quote, or a newline.
fn escape_csv(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn write_jsonl(out: &mut impl Write, records: &[Record]) -> io::Result<()> {
    for record in records {
        serde_json::to_writer(&mut *out, record)?;
        writeln!(out)?;
    }
    Ok(())
}
