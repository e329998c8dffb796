use std::fs;
use std::io::BufWriter;
use std::path::Path;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Parquet,
    Ipc,
    Csv,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    Snappy,
    Lz4Raw,
    Zstd,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DatasetStorage {
    pub path: String, // File location (relative to the working directory)
    pub format: Format,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression: Option<Compression>, // Ignored for csv
}

impl DatasetStorage {
    pub fn new(path: impl Into<String>, format: Format, compression: Option<Compression>) -> Self {
        Self {
            path: path.into(),
            format,
            compression,
        }
    }

    pub fn scan(&self) -> Result<LazyFrame> {
        debug!(path = %self.path, format = ?self.format, "scanning dataset");
        let lf = match self.format {
            Format::Parquet => LazyFrame::scan_parquet(&self.path, ScanArgsParquet::default())?,
            Format::Ipc => LazyFrame::scan_ipc(&self.path, ScanArgsIpc::default())?,
            Format::Csv => LazyCsvReader::new(&self.path).with_has_header(true).finish()?,
        };
        Ok(lf)
    }

    pub fn write(&self, df: &mut DataFrame) -> Result<()> {
        if let Some(parent) = Path::new(&self.path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = BufWriter::new(fs::File::create(&self.path)?);
        debug!(path = %self.path, shape = ?df.shape(), "writing dataset");
        match self.format {
            Format::Parquet => {
                let compression = match self.compression {
                    Some(Compression::Snappy) => ParquetCompression::Snappy,
                    Some(Compression::Lz4Raw) => ParquetCompression::Lz4Raw,
                    Some(Compression::Zstd) => ParquetCompression::Zstd(None),
                    None => ParquetCompression::Uncompressed,
                };
                ParquetWriter::new(&mut file)
                    .with_compression(compression)
                    .finish(df)?;
            }
            Format::Ipc => {
                let compression = match self.compression {
                    Some(Compression::Zstd) => Some(IpcCompression::ZSTD),
                    Some(Compression::Lz4Raw) => Some(IpcCompression::LZ4),
                    Some(Compression::Snappy) | None => None,
                };
                IpcWriter::new(&mut file)
                    .with_compression(compression)
                    .finish(df)?;
            }
            Format::Csv => {
                CsvWriter::new(&mut file).include_header(true).finish(df)?;
            }
        }
        Ok(())
    }
}
