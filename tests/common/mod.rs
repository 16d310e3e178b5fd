#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

/// Writes the standard four-source fixture set (two periods, each with a
/// group sheet and an item-only sheet) plus the two reference tables, and
/// returns the source paths in ingestion order.
pub fn write_standard_fixtures(workspace: &TestWorkspace) -> Vec<PathBuf> {
    let may_group = workspace.write(
        "May_Data_Matrix.csv",
        "Group,Amount,Count\nBakery,100,20\nDairy,50,0\n",
    );
    let may_items = workspace.write(
        "May_Items.csv",
        "Item Name,Amount,Count\nBagel,$30,10\nCroissant,24,8\n",
    );
    let june_group = workspace.write(
        "June_Data_Matrix.csv",
        "Group,Amount,Revenue\nProduce,75,200\n",
    );
    let june_items = workspace.write(
        "June_Items.csv",
        "Item Name,Amount,Count\nMuffin,36,abc\n",
    );
    workspace.write(
        "ingredients.csv",
        "Item name,Flour (kg),Sugar (kg)\nbagel,0.2,0.1\nPretzel,0.3,0\n",
    );
    workspace.write(
        "shipments.csv",
        "Ingredient,Qty,Date\nFlour + Sugar,10,2024-05-01\nFlour,5,2024-05-02\nSaffron,1,2024-05-03\n",
    );
    vec![may_group, may_items, june_group, june_items]
}
