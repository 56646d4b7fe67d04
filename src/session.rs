//! Owned, explicitly reloadable holder of the normalized order table.

use crate::error::Result;
use crate::models::Table;
use crate::storage;
use crate::views::{View, ViewOutput};
use std::path::{Path, PathBuf};

/// A loaded dataset plus the file it came from.
///
/// Views are recomputed from the held table on every call; only the table itself is kept.
#[derive(Debug, Clone)]
pub struct Session {
    source: PathBuf,
    table: Table,
}

impl Session {
    /// Load and normalize `path`. An empty table is accepted and reported once as a warning.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = path.as_ref().to_path_buf();
        let table = read(&source)?;
        Ok(Self { source, table })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Re-read the backing file. On failure the previously loaded table stays in place.
    pub fn reload(&mut self) -> Result<()> {
        let table = read(&self.source)?;
        log::info!(
            "reloaded {}: {} -> {} rows",
            self.source.display(),
            self.table.len(),
            table.len()
        );
        self.table = table;
        Ok(())
    }

    pub fn compute(&self, view: View) -> Result<ViewOutput> {
        view.compute(&self.table)
    }
}

fn read(path: &Path) -> Result<Table> {
    let table = storage::load_normalized(path)?;
    if table.is_empty() {
        log::warn!("{} contains no orders; every view will be empty", path.display());
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const HEADER: &str = "order_date,sales,profit,quantity,category,sub_category,segment,product_name,ship_mode\n";

    #[test]
    fn failed_reload_keeps_previous_table() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("orders.csv");
        fs::write(
            &p,
            format!("{HEADER}2017-01-02,10,1,1,Technology,Phones,Consumer,P1,Same Day\n"),
        )
        .unwrap();
        let mut session = Session::open(&p).unwrap();
        assert_eq!(session.table().len(), 1);

        fs::write(
            &p,
            format!("{HEADER}not a date,10,1,1,Technology,Phones,Consumer,P1,Same Day\n"),
        )
        .unwrap();
        assert!(session.reload().is_err());
        assert_eq!(session.table().len(), 1);
    }
}
