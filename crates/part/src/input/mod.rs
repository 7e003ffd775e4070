//! Reading graphs stored on disk.
//!
//! A graph on disk is described by a manifest (key/value text file) that
//! points at four binary files: the forward and backward CSR, each split
//! into a dense offset array and a dense target array. Every rank maps the
//! files and cuts out its own slice of rows, so loading is embarrassingly
//! parallel across ranks.

pub mod binary;
pub mod manifest;

pub use binary::load_array;
pub use manifest::{Endian, Manifest};

use crate::graph::{CsrPart, DirectedGraphPart};
use crate::index::Idx;
use crate::partition::Part;
use crate::Error;

use log::info;
use std::time::Instant;

/// Loads the partition-local slice of the graph described by `manifest`.
///
/// The offset arrays carry `node_count + 1` entries, the target arrays
/// `edge_count` entries, in the element widths and byte order the manifest
/// declares. Offsets must be non-decreasing and end at `edge_count`;
/// targets must be valid vertex ids. Violations are reported as
/// [`Error::Assumption`].
pub fn load_graph_part<V, E, P>(manifest: &Manifest, part: P) -> Result<DirectedGraphPart<V, E, P>, Error>
where
    V: Idx,
    E: Idx,
    P: Part,
{
    let start = Instant::now();
    let n = manifest.node_count as usize;
    let m = manifest.edge_count as usize;
    if part.n() != n {
        return Err(Error::Assumption(format!(
            "partition covers {} vertices but the manifest declares {}",
            part.n(),
            n
        )));
    }

    let csr_out = load_csr_slice(
        manifest,
        &part,
        n,
        m,
        &manifest.fw_head_path,
        &manifest.fw_csr_path,
    )?;
    let csr_inc = load_csr_slice(
        manifest,
        &part,
        n,
        m,
        &manifest.bw_head_path,
        &manifest.bw_csr_path,
    )?;

    info!(
        "Loaded graph '{}' slice [{}, {}) in {:?}",
        manifest.graph_name,
        part.begin(),
        part.end(),
        start.elapsed()
    );

    Ok(DirectedGraphPart::new(part, csr_out, csr_inc))
}

fn load_csr_slice<V, E, P>(
    manifest: &Manifest,
    part: &P,
    n: usize,
    m: usize,
    head_path: &std::path::Path,
    csr_path: &std::path::Path,
) -> Result<CsrPart<V, E>, Error>
where
    V: Idx,
    E: Idx,
    P: Part,
{
    let offsets = load_array(
        head_path,
        manifest.head_bytes,
        manifest.endian,
        n as u64 + 1,
    )?;
    if offsets.first() != Some(&0) {
        return Err(Error::Assumption("offset array must start at 0".into()));
    }
    if offsets.last() != Some(&(m as u64)) {
        return Err(Error::Assumption(format!(
            "offset array must end at the edge count {}",
            m
        )));
    }
    if offsets.windows(2).any(|pair| pair[0] > pair[1]) {
        return Err(Error::Assumption("offset array must be non-decreasing".into()));
    }

    let (begin, end) = (part.begin(), part.end());
    let base = offsets[begin];
    let local_offsets = offsets[begin..=end]
        .iter()
        .map(|&offset| E::new((offset - base) as usize))
        .collect::<Vec<_>>();

    let targets = load_array(csr_path, manifest.csr_bytes, manifest.endian, m as u64)?;
    let local_targets = targets[base as usize..offsets[end] as usize]
        .iter()
        .map(|&target| {
            if target >= n as u64 {
                return Err(Error::Assumption(format!(
                    "target {} is out of the vertex range [0, {})",
                    target, n
                )));
            }
            Ok(V::new(target as usize))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CsrPart::new(
        local_offsets.into_boxed_slice(),
        local_targets.into_boxed_slice(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::TrivialSlicePart;
    use std::io::Write;

    fn write_u64s(dir: &std::path::Path, name: &str, values: &[u64], width: u8) {
        let mut bytes = Vec::new();
        for &value in values {
            bytes.extend_from_slice(&value.to_le_bytes()[..width as usize]);
        }
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        file.write_all(&bytes).unwrap();
    }

    fn write_manifest(dir: &std::path::Path, node_count: u64, edge_count: u64) -> Manifest {
        let text = format!(
            "schema.version 1\n\
             graph.code test\n\
             graph.name three-cycle\n\
             graph.endian little\n\
             graph.node_count {node_count}\n\
             graph.edge_count {edge_count}\n\
             graph.contains_self_loops false\n\
             graph.contains_duplicate_edges false\n\
             graph.head.bytes 4\n\
             graph.csr.bytes 2\n\
             fw.head.path fw.head\n\
             fw.csr.path fw.csr\n\
             bw.head.path bw.head\n\
             bw.csr.path bw.csr\n"
        );
        let path = dir.join("graph.manifest");
        std::fs::write(&path, text).unwrap();
        Manifest::load(&path).unwrap()
    }

    #[test]
    fn loads_partition_slice() {
        let dir = tempfile::tempdir().unwrap();
        // 0 -> 1 -> 2 -> 0
        write_u64s(dir.path(), "fw.head", &[0, 1, 2, 3], 4);
        write_u64s(dir.path(), "fw.csr", &[1, 2, 0], 2);
        write_u64s(dir.path(), "bw.head", &[0, 1, 2, 3], 4);
        write_u64s(dir.path(), "bw.csr", &[2, 0, 1], 2);
        let manifest = write_manifest(dir.path(), 3, 3);

        let part = TrivialSlicePart::new(3, 1, 2);
        let g = load_graph_part::<u32, u64, _>(&manifest, part).unwrap();
        assert_eq!(g.part().local_n(), 2);
        assert_eq!(g.out_neighbors(0), &[2]);
        assert_eq!(g.out_neighbors(1), &[0]);
        assert_eq!(g.in_neighbors(0), &[0]);
        assert_eq!(g.in_neighbors(1), &[1]);
    }

    #[test]
    fn rejects_truncated_offsets() {
        let dir = tempfile::tempdir().unwrap();
        write_u64s(dir.path(), "fw.head", &[0, 1, 2, 2], 4);
        write_u64s(dir.path(), "fw.csr", &[1, 2, 0], 2);
        write_u64s(dir.path(), "bw.head", &[0, 1, 2, 3], 4);
        write_u64s(dir.path(), "bw.csr", &[2, 0, 1], 2);
        let manifest = write_manifest(dir.path(), 3, 3);

        let part = TrivialSlicePart::new(3, 0, 1);
        let result = load_graph_part::<u32, u64, _>(&manifest, part);
        assert!(matches!(result, Err(Error::Assumption(_))));
    }

    #[test]
    fn rejects_out_of_range_targets() {
        let dir = tempfile::tempdir().unwrap();
        write_u64s(dir.path(), "fw.head", &[0, 1, 2, 3], 4);
        write_u64s(dir.path(), "fw.csr", &[1, 2, 7], 2);
        write_u64s(dir.path(), "bw.head", &[0, 1, 2, 3], 4);
        write_u64s(dir.path(), "bw.csr", &[2, 0, 1], 2);
        let manifest = write_manifest(dir.path(), 3, 3);

        let part = TrivialSlicePart::new(3, 0, 1);
        let result = load_graph_part::<u32, u64, _>(&manifest, part);
        assert!(matches!(result, Err(Error::Assumption(_))));
    }
}
