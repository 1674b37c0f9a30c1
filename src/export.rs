use std::collections::BTreeSet;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::config::{ExportConfig, ExportFormat, WriteMode};
use crate::error::{Error, Result};
use crate::results::{CrawlReport, FormRecord, dedup_records};

const TSV_HEADER: &str = "page_url\taction\tmethod\tkinds\tfields\tcaptcha";

/// Writes detected forms to a file
#[derive(Debug, Clone)]
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Write the records, one per page URL in page URL order. Returns how many were written.
    pub fn export(&self, records: &[FormRecord]) -> Result<usize> {
        let path = &self.config.output;
        let records = dedup_records(records);

        let file = open(path, self.config.mode).map_err(|source| export_error(path, source))?;
        let starts_empty = file
            .metadata()
            .map(|m| m.len() == 0)
            .map_err(|source| export_error(path, source))?;

        let mut writer = BufWriter::new(file);
        write_records(&mut writer, self.config.format, self.config.mode, starts_empty, &records)
            .and_then(|_| writer.flush())
            .map_err(|source| export_error(path, source))?;

        ::log::info!("Exported {} records to {}", records.len(), path.display());
        Ok(records.len())
    }

    /// Write the full per-site report as pretty JSON, if a report path is configured
    pub fn export_report(&self, report: &CrawlReport) -> Result<()> {
        let Some(path) = &self.config.report else {
            return Ok(());
        };

        let file = File::create(path).map_err(|source| export_error(path, source))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, report)
            .map_err(io::Error::from)
            .and_then(|_| writer.write_all(b"\n"))
            .and_then(|_| writer.flush())
            .map_err(|source| export_error(path, source))?;

        ::log::info!("Wrote crawl report to {}", path.display());
        Ok(())
    }
}

fn open(path: &Path, mode: WriteMode) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true);
    match mode {
        WriteMode::Overwrite => options.write(true).truncate(true),
        WriteMode::Append => options.append(true),
    };
    options.open(path)
}

fn export_error(path: &Path, source: io::Error) -> Error {
    Error::Export {
        path: path.to_path_buf(),
        source,
    }
}

/// Serialize records in the given format
pub fn write_records<W: Write>(
    writer: &mut W,
    format: ExportFormat,
    mode: WriteMode,
    starts_empty: bool,
    records: &[FormRecord],
) -> io::Result<()> {
    match format {
        ExportFormat::Text => {
            for record in records {
                writeln!(writer, "{}", record.page_url)?;
            }
        }
        ExportFormat::Tsv => {
            if starts_empty {
                writeln!(writer, "{}", TSV_HEADER)?;
            }
            for record in records {
                writeln!(writer, "{}", tsv_row(record))?;
            }
        }
        ExportFormat::Json => match mode {
            WriteMode::Overwrite => {
                serde_json::to_writer_pretty(&mut *writer, records)?;
                writeln!(writer)?;
            }
            // JSON Lines keeps an appended file parseable
            WriteMode::Append => {
                for record in records {
                    serde_json::to_writer(&mut *writer, record)?;
                    writeln!(writer)?;
                }
            }
        },
    }
    Ok(())
}

fn tsv_row(record: &FormRecord) -> String {
    let join = |items: &BTreeSet<String>| {
        items.iter().map(String::as_str).collect::<Vec<_>>().join(",")
    };

    [
        record.page_url.clone(),
        record.action.clone(),
        record.method.clone(),
        join(&record.kinds),
        join(&record.recognized_fields),
        record.captcha.to_string(),
    ]
    .iter()
    .map(|cell| tsv_cell(cell))
    .collect::<Vec<_>>()
    .join("\t")
}

fn tsv_cell(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}
