use anyhow::{anyhow, bail, Context, Result};
use arrow::{
    array::{Array, StringArray},
    compute::cast,
    datatypes::DataType,
};
use csv::ReaderBuilder;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::{
    fs::File,
    io::{BufReader, Cursor, Read},
    path::Path,
};
use tracing::debug;
use zip::ZipArchive;

use super::RawTable;

/// Container formats a table can be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    CsvZstd,
    Zip,
    Parquet,
}

impl TableFormat {
    /// Detect the format from the file name; `None` for anything else.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".csv.zst") || name.ends_with(".zst") {
            Some(TableFormat::CsvZstd)
        } else if name.ends_with(".csv") {
            Some(TableFormat::Csv)
        } else if name.ends_with(".zip") {
            Some(TableFormat::Zip)
        } else if name.ends_with(".parquet") {
            Some(TableFormat::Parquet)
        } else {
            None
        }
    }
}

/// Read a whole table into memory. All cells come back as strings.
#[tracing::instrument(level = "debug", skip(path), fields(path = %path.display()))]
pub fn load_table(path: &Path) -> Result<RawTable> {
    let format = TableFormat::from_path(path)
        .ok_or_else(|| anyhow!("unsupported table format: {}", path.display()))?;
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;

    let table = match format {
        TableFormat::Csv => read_csv(BufReader::new(file)),
        TableFormat::CsvZstd => {
            let decoder = zstd::stream::read::Decoder::new(file)
                .with_context(|| format!("starting zstd decoder for {}", path.display()))?;
            read_csv(decoder)
        }
        TableFormat::Zip => read_zipped_csv(file),
        TableFormat::Parquet => read_parquet(file),
    }
    .with_context(|| format!("reading {}", path.display()))?;

    debug!(
        columns = table.headers.len(),
        rows = table.rows.len(),
        ?format,
        "loaded table"
    );
    Ok(table)
}

fn read_csv<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .context("reading CSV header row")?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        bail!("CSV has no header row");
    }

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("CSV parse error at record {}", idx))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable::new(headers, rows))
}

/// The first `.csv` entry in archive order is the table.
fn read_zipped_csv(file: File) -> Result<RawTable> {
    let mut archive = ZipArchive::new(file).context("reading ZIP archive")?;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .with_context(|| format!("accessing ZIP entry #{}", i))?;
        if !entry.is_file() || !entry.name().to_lowercase().ends_with(".csv") {
            continue;
        }
        let name = entry.name().to_string();
        let mut buf = Vec::new();
        entry
            .read_to_end(&mut buf)
            .with_context(|| format!("reading {} into memory", name))?;
        return read_csv(Cursor::new(buf));
    }
    bail!("ZIP archive has no .csv entry")
}

fn read_parquet(file: File) -> Result<RawTable> {
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch in reader {
        let batch = batch.context("reading parquet batch")?;
        let columns = batch
            .columns()
            .iter()
            .map(|col| cast(col, &DataType::Utf8))
            .collect::<Result<Vec<_>, _>>()
            .context("casting parquet columns to strings")?;
        let strings = columns
            .iter()
            .map(|col| {
                col.as_any()
                    .downcast_ref::<StringArray>()
                    .ok_or_else(|| anyhow!("cast to Utf8 did not yield a string array"))
            })
            .collect::<Result<Vec<_>>>()?;

        for r in 0..batch.num_rows() {
            rows.push(
                strings
                    .iter()
                    .map(|s| {
                        if s.is_null(r) {
                            String::new()
                        } else {
                            s.value(r).to_string()
                        }
                    })
                    .collect(),
            );
        }
    }

    Ok(RawTable::new(headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use arrow::{
        array::{ArrayRef, Float64Array, StringArray},
        datatypes::{Field, Schema},
        record_batch::RecordBatch,
    };
    use parquet::arrow::ArrowWriter;
    use std::{fs, io::Write, sync::Arc};
    use tempfile::tempdir;
    use zip::write::SimpleFileOptions;
    use zip::CompressionMethod;

    const SAMPLE: &str = "appl_id,award_amount,notice_date\n10,100.5,2024-03-01\n11,,2024-03-04\n";

    fn assert_sample(t: &RawTable) {
        assert_eq!(t.headers, vec!["appl_id", "award_amount", "notice_date"]);
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.cell(0, 1), "100.5");
        assert_eq!(t.cell(1, 1), "");
    }

    #[test]
    fn detects_formats() {
        assert_eq!(
            TableFormat::from_path(Path::new("a/nih_awards_all.csv.zst")),
            Some(TableFormat::CsvZstd)
        );
        assert_eq!(
            TableFormat::from_path(Path::new("X.CSV")),
            Some(TableFormat::Csv)
        );
        assert_eq!(
            TableFormat::from_path(Path::new("amounts.parquet")),
            Some(TableFormat::Parquet)
        );
        assert_eq!(TableFormat::from_path(Path::new("notes.txt")), None);
    }

    #[test]
    fn reads_plain_csv() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("t.csv");
        fs::write(&path, SAMPLE)?;
        assert_sample(&load_table(&path)?);
        Ok(())
    }

    #[test]
    fn strips_byte_order_mark_from_headers() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("bom.csv");
        fs::write(&path, format!("\u{feff}{}", SAMPLE))?;
        assert_eq!(load_table(&path)?.headers[0], "appl_id");
        Ok(())
    }

    #[test]
    fn reads_zstd_csv() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("t.csv.zst");
        fs::write(&path, zstd::encode_all(SAMPLE.as_bytes(), 3)?)?;
        assert_sample(&load_table(&path)?);
        Ok(())
    }

    #[test]
    fn reads_first_csv_in_zip() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("t.zip");
        {
            let mut zip = zip::ZipWriter::new(fs::File::create(&path)?);
            let options =
                SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
            zip.start_file("README.txt", options)?;
            zip.write_all(b"not a table")?;
            zip.start_file("awards.csv", options)?;
            zip.write_all(SAMPLE.as_bytes())?;
            zip.finish()?;
        }
        assert_sample(&load_table(&path)?);
        Ok(())
    }

    #[test]
    fn ignores_declared_entry_size() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("t.zip");
        let mut bytes = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut bytes));
            let options =
                SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
            zip.start_file("awards.csv", options)?;
            zip.write_all(SAMPLE.as_bytes())?;
            zip.finish()?;
        }
        // central directory entry: uncompressed size lives 24 bytes past the signature
        let cd = bytes
            .windows(4)
            .position(|w| w == b"PK\x01\x02")
            .expect("central directory");
        bytes[cd + 24..cd + 28].copy_from_slice(&0x7FFF_FFF0u32.to_le_bytes());
        fs::write(&path, &bytes)?;

        assert_sample(&load_table(&path)?);
        Ok(())
    }

    #[test]
    fn reads_parquet_as_strings() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("t.parquet");
        let schema = Arc::new(Schema::new(vec![
            Field::new("appl_id", DataType::Utf8, false),
            Field::new("award_amount", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["10", "11"])) as ArrayRef,
                Arc::new(Float64Array::from(vec![Some(100.5), None])) as ArrayRef,
            ],
        )?;
        let mut writer = ArrowWriter::try_new(fs::File::create(&path)?, schema, None)?;
        writer.write(&batch)?;
        writer.close()?;

        let t = load_table(&path)?;
        assert_eq!(t.headers, vec!["appl_id", "award_amount"]);
        assert_eq!(t.cell(0, 1), "100.5");
        assert_eq!(t.cell(1, 1), "");
        Ok(())
    }

    #[test]
    fn rejects_unknown_extension() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("t.txt");
        fs::write(&path, SAMPLE)?;
        assert!(load_table(&path).is_err());
        Ok(())
    }
}
