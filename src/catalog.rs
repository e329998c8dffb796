use polars::prelude::*;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::config::Settings;
use crate::error::{PipelineError, Result};
use crate::storage::DatasetStorage;

pub enum DatasetEntry {
    Memory(Option<DataFrame>),
    Storage(DatasetStorage),
}

/// Named datasets a pipeline reads from and writes to.
pub struct DataCatalog {
    datasets: RwLock<HashMap<String, DatasetEntry>>,
}

impl Default for DataCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl DataCatalog {
    pub fn new() -> Self {
        let datasets = RwLock::new(HashMap::new());
        Self { datasets }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let datasets = settings
            .catalog
            .iter()
            .map(|(name, storage)| (name.clone(), DatasetEntry::Storage(storage.clone())))
            .collect::<HashMap<String, DatasetEntry>>();
        Self { datasets: RwLock::new(datasets) }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, DatasetEntry>>> {
        self.datasets
            .read()
            .map_err(|_| PipelineError::Catalog("dataset map lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, DatasetEntry>>> {
        self.datasets
            .write()
            .map_err(|_| PipelineError::Catalog("dataset map lock poisoned".to_string()))
    }

    pub fn register(&self, name: impl Into<String>, entry: DatasetEntry) -> Result<()> {
        self.write()?.insert(name.into(), entry);
        Ok(())
    }

    pub fn add_frame(&self, name: impl Into<String>, df: DataFrame) -> Result<()> {
        self.register(name, DatasetEntry::Memory(Some(df)))
    }

    pub fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.read()?.contains_key(name))
    }

    pub fn names(&self) -> Result<Vec<String>> {
        let mut names = self.read()?.keys().cloned().collect::<Vec<String>>();
        names.sort();
        Ok(names)
    }

    pub fn describe(&self, name: &str) -> Result<String> {
        match self.read()?.get(name) {
            Some(DatasetEntry::Memory(_)) => Ok("memory".to_string()),
            Some(DatasetEntry::Storage(s)) => Ok(format!("{:?} {}", s.format, s.path)),
            None => Err(PipelineError::DatasetNotFound(name.to_string())),
        }
    }

    pub fn load(&self, name: &str) -> Result<LazyFrame> {
        debug!(dataset = name, "loading dataset");
        match self.read()?.get(name) {
            Some(DatasetEntry::Memory(Some(df))) => Ok(df.clone().lazy()),
            Some(DatasetEntry::Memory(None)) => Err(PipelineError::DatasetNotLoaded(name.to_string())),
            Some(DatasetEntry::Storage(storage)) => storage.scan(),
            None => Err(PipelineError::DatasetNotFound(name.to_string())),
        }
    }

    /// Loads every dataset in `names` in parallel, keeping the order of `names`.
    pub fn load_many(&self, names: &[String]) -> Result<Vec<LazyFrame>> {
        names
            .par_iter()
            .map(|name| self.load(name))
            .collect::<Result<Vec<LazyFrame>>>()
    }

    /// Writes `df` to the named dataset. Unknown names become memory datasets.
    pub fn save(&self, name: &str, mut df: DataFrame) -> Result<()> {
        debug!(dataset = name, shape = ?df.shape(), "saving dataset");
        let storage = match self.read()?.get(name) {
            Some(DatasetEntry::Storage(storage)) => Some(storage.clone()),
            _ => None,
        };
        // File writes happen outside the map lock.
        match storage {
            Some(storage) => storage.write(&mut df),
            None => {
                self.write()?
                    .insert(name.to_string(), DatasetEntry::Memory(Some(df)));
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Format;

    fn frame() -> PolarsResult<DataFrame> {
        df!(
            "country_name" => ["US"],
            "week" => ["2024-03-01"],
            "term" => ["cats"],
            "score" => [5.0],
        )
    }

    #[test]
    fn memory_datasets() -> Result<()> {
        let catalog = DataCatalog::new();
        catalog.add_frame("trends", frame()?)?;
        catalog.register("later", DatasetEntry::Memory(None))?;

        assert!(catalog.contains("trends")?);
        assert_eq!(catalog.names()?, vec!["later".to_string(), "trends".to_string()]);
        assert_eq!(catalog.load("trends")?.collect()?.height(), 1);
        assert!(matches!(catalog.load("later"), Err(PipelineError::DatasetNotLoaded(_))));
        assert!(matches!(catalog.load("missing"), Err(PipelineError::DatasetNotFound(_))));

        catalog.save("later", frame()?)?;
        assert_eq!(catalog.load("later")?.collect()?.height(), 1);
        Ok(())
    }

    #[test]
    fn save_unknown_name_creates_memory_dataset() -> Result<()> {
        let catalog = DataCatalog::new();
        catalog.save("fresh", frame()?)?;
        assert_eq!(catalog.describe("fresh")?, "memory");
        Ok(())
    }

    #[test]
    fn storage_datasets_from_settings() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.parquet").to_string_lossy().to_string();
        let mut settings = Settings::default();
        settings
            .catalog
            .insert("out".to_string(), DatasetStorage::new(path.clone(), Format::Parquet, None));

        let catalog = DataCatalog::from_settings(&settings);
        catalog.save("out", frame()?)?;
        assert!(std::path::Path::new(&path).exists());
        assert!(catalog.load("out")?.collect()?.equals(&frame()?));
        Ok(())
    }

    #[test]
    fn saving_to_storage_keeps_entry_and_map_readable() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.csv").to_string_lossy().to_string();
        let catalog = DataCatalog::new();
        catalog.register(
            "out",
            DatasetEntry::Storage(DatasetStorage::new(path.clone(), Format::Csv, None)),
        )?;

        std::thread::scope(|scope| -> Result<()> {
            let writer = scope.spawn(|| -> Result<()> { catalog.save("out", frame()?) });
            assert!(catalog.contains("out")?);
            writer
                .join()
                .map_err(|_| PipelineError::Catalog("writer panicked".to_string()))?
        })?;

        assert_eq!(catalog.describe("out")?, format!("Csv {path}"));
        assert_eq!(catalog.load("out")?.collect()?.height(), 1);
        Ok(())
    }

    #[test]
    fn load_many_keeps_order() -> Result<()> {
        let catalog = DataCatalog::new();
        catalog.add_frame("a", df!("x" => [1i64])?)?;
        catalog.add_frame("b", df!("x" => [1i64, 2])?)?;
        let frames = catalog.load_many(&["b".to_string(), "a".to_string()])?;
        let heights = frames
            .into_iter()
            .map(|lf| -> Result<usize> { Ok(lf.collect()?.height()) })
            .collect::<Result<Vec<usize>>>()?;
        assert_eq!(heights, vec![2, 1]);
        Ok(())
    }
}
