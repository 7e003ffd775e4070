//! The plain-text manifest describing a graph on disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::Error;

/// Byte order of the binary arrays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// Parsed manifest contents.
///
/// The file format is line based: `key SP value`, one pair per line, `%`
/// starting a comment line. Every key below is required, unknown keys are
/// rejected, and the four paths are resolved relative to the manifest's
/// directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Manifest {
    pub schema_version: u32,
    pub graph_code: String,
    pub graph_name: String,
    pub endian: Endian,
    pub node_count: u64,
    pub edge_count: u64,
    pub contains_self_loops: bool,
    pub contains_duplicate_edges: bool,
    pub head_bytes: u8,
    pub csr_bytes: u8,
    pub fw_head_path: PathBuf,
    pub fw_csr_path: PathBuf,
    pub bw_head_path: PathBuf,
    pub bw_csr_path: PathBuf,
}

const KEYS: &[&str] = &[
    "schema.version",
    "graph.code",
    "graph.name",
    "graph.endian",
    "graph.node_count",
    "graph.edge_count",
    "graph.contains_self_loops",
    "graph.contains_duplicate_edges",
    "graph.head.bytes",
    "graph.csr.bytes",
    "fw.head.path",
    "fw.csr.path",
    "bw.head.path",
    "bw.csr.path",
];

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        let base = path
            .parent()
            .ok_or_else(|| Error::Filesystem(format!("{} has no parent directory", path.display())))?;

        let mut pairs = HashMap::new();
        for line in text.lines() {
            if line.is_empty() || line.starts_with('%') {
                continue;
            }
            let (key, value) = line
                .split_once(' ')
                .ok_or_else(|| Error::Deserialize(format!("malformed line {:?}", line)))?;
            let value = value.trim_start_matches(' ');
            if !KEYS.contains(&key) {
                return Err(Error::Deserialize(format!("unknown key {:?}", key)));
            }
            if pairs.insert(key, value).is_some() {
                return Err(Error::Deserialize(format!("duplicate key {:?}", key)));
            }
        }

        let get = |key: &str| {
            pairs
                .get(key)
                .copied()
                .ok_or_else(|| Error::Deserialize(format!("missing key {:?}", key)))
        };

        let manifest = Manifest {
            schema_version: parse_int(get("schema.version")?)?,
            graph_code: get("graph.code")?.to_string(),
            graph_name: get("graph.name")?.to_string(),
            endian: parse_endian(get("graph.endian")?)?,
            node_count: parse_int(get("graph.node_count")?)?,
            edge_count: parse_int(get("graph.edge_count")?)?,
            contains_self_loops: parse_bool(get("graph.contains_self_loops")?)?,
            contains_duplicate_edges: parse_bool(get("graph.contains_duplicate_edges")?)?,
            head_bytes: parse_int(get("graph.head.bytes")?)?,
            csr_bytes: parse_int(get("graph.csr.bytes")?)?,
            fw_head_path: resolve(base, get("fw.head.path")?)?,
            fw_csr_path: resolve(base, get("fw.csr.path")?)?,
            bw_head_path: resolve(base, get("bw.head.path")?)?,
            bw_csr_path: resolve(base, get("bw.csr.path")?)?,
        };

        if !(1..=8).contains(&manifest.head_bytes) {
            return Err(Error::InvalidWidth {
                width: manifest.head_bytes,
            });
        }
        if !(1..=8).contains(&manifest.csr_bytes) {
            return Err(Error::InvalidWidth {
                width: manifest.csr_bytes,
            });
        }

        Ok(manifest)
    }
}

fn parse_int<T: std::str::FromStr>(value: &str) -> Result<T, Error> {
    value
        .parse()
        .map_err(|_| Error::Deserialize(format!("not an integer: {:?}", value)))
}

fn parse_bool(value: &str) -> Result<bool, Error> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(Error::Deserialize(format!("not a boolean: {:?}", value))),
    }
}

fn parse_endian(value: &str) -> Result<Endian, Error> {
    match value {
        "little" => Ok(Endian::Little),
        "big" => Ok(Endian::Big),
        _ => Err(Error::Deserialize(format!("not an endianness: {:?}", value))),
    }
}

fn resolve(base: &Path, relative: &str) -> Result<PathBuf, Error> {
    let path = base.join(relative);
    if !path.is_file() {
        return Err(Error::Filesystem(format!(
            "{} is not a regular file",
            path.display()
        )));
    }
    Ok(path)
}
