use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

/// Fixture name to path, relative to the workspace `fixtures/` directory.
type Entries = BTreeMap<String, String>;

#[derive(Debug, Deserialize)]
struct Manifest {
    sorting: Entries,
    graphs: Entries,
    grids: Entries,
}

#[derive(Clone, Copy)]
enum Family {
    Sorting,
    Graphs,
    Grids,
}

impl Family {
    fn entries(self) -> &'static Entries {
        match self {
            Self::Sorting => &MANIFEST.sorting,
            Self::Graphs => &MANIFEST.graphs,
            Self::Grids => &MANIFEST.grids,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Sorting => "sorting",
            Self::Graphs => "graph",
            Self::Grids => "grid",
        }
    }

    /// Manifest order is already sorted.
    fn keys(self) -> Vec<String> {
        self.entries().keys().cloned().collect()
    }

    fn path(self, name: &str) -> Result<PathBuf> {
        let rel = self
            .entries()
            .get(name)
            .ok_or_else(|| anyhow!("unknown {} fixture '{name}'", self.label()))?;
        Ok(Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures")
            .join(rel))
    }

    fn json(self, name: &str) -> Result<String> {
        let path = self.path(name)?;
        fs::read_to_string(&path)
            .with_context(|| format!("failed to read fixture at {}", path.display()))
    }

    fn load<T: DeserializeOwned>(self, name: &str) -> Result<T> {
        serde_json::from_str(&self.json(name)?)
            .with_context(|| format!("failed to parse {} fixture {name}", self.label()))
    }
}

pub mod sorting {
    use super::*;

    /// Input array plus expected results per algorithm name.
    #[derive(Debug, Clone, Deserialize)]
    pub struct SortCase {
        pub input: Vec<i64>,
        pub sorted: Vec<i64>,
        /// Expected swap count keyed by algorithm name.
        #[serde(default)]
        pub swaps: HashMap<String, usize>,
        /// Array after each swap, keyed by algorithm name.
        #[serde(default)]
        pub swap_trace: HashMap<String, Vec<Vec<i64>>>,
    }

    pub fn keys() -> Vec<String> {
        Family::Sorting.keys()
    }

    pub fn json(name: &str) -> Result<String> {
        Family::Sorting.json(name)
    }

    pub fn load(name: &str) -> Result<SortCase> {
        Family::Sorting.load(name)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Family::Sorting.path(name)
    }
}

pub mod graphs {
    use super::*;

    #[derive(Debug, Clone, Deserialize)]
    pub struct GraphCase {
        pub nodes: usize,
        pub directed: bool,
        /// `[from, to, weight]` triples.
        pub edges: Vec<(usize, usize, u32)>,
        pub start: usize,
        pub bfs_order: Vec<usize>,
        pub dfs_order: Vec<usize>,
        /// Dijkstra distances; `null` for unreachable nodes.
        pub distances: Vec<Option<u64>>,
    }

    pub fn keys() -> Vec<String> {
        Family::Graphs.keys()
    }

    pub fn json(name: &str) -> Result<String> {
        Family::Graphs.json(name)
    }

    pub fn load(name: &str) -> Result<GraphCase> {
        Family::Graphs.load(name)
    }
}

pub mod grids {
    use super::*;

    #[derive(Debug, Clone, Deserialize)]
    pub struct GridCase {
        /// `#` marks a wall.
        pub rows: Vec<String>,
        pub start: (usize, usize),
        pub end: (usize, usize),
        /// Cells on a shortest path including both ends; `null` when blocked.
        pub path_len: Option<usize>,
    }

    pub fn keys() -> Vec<String> {
        Family::Grids.keys()
    }

    pub fn json(name: &str) -> Result<String> {
        Family::Grids.json(name)
    }

    pub fn load(name: &str) -> Result<GridCase> {
        Family::Grids.load(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_manifest_entry_loads() -> Result<()> {
        for name in sorting::keys() {
            let case = sorting::load(&name)?;
            assert_eq!(case.input.len(), case.sorted.len(), "{name}");
        }
        for name in graphs::keys() {
            let case = graphs::load(&name)?;
            assert_eq!(case.distances.len(), case.nodes, "{name}");
        }
        for name in grids::keys() {
            let case = grids::load(&name)?;
            assert!(!case.rows.is_empty(), "{name}");
        }
        Ok(())
    }

    #[test]
    fn unknown_fixture_is_an_error() {
        let err = sorting::load("missing").unwrap_err();
        assert!(err.to_string().contains("unknown sorting fixture 'missing'"));
    }

    #[test]
    fn paths_point_at_files() -> Result<()> {
        assert!(sorting::path("small")?.exists());
        assert!(sorting::json("small")?.contains("\"input\""));
        assert!(graphs::json("weighted-six")?.contains("\"edges\""));
        assert!(grids::json("blocked")?.contains("\"rows\""));
        Ok(())
    }
}
