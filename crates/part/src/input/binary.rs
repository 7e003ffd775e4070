//! Dense unsigned integer arrays stored as raw bytes.

use std::fs::File;
use std::path::Path;

use byte_slice_cast::AsSliceOf;

use crate::input::manifest::Endian;
use crate::Error;

/// Memory-maps `path` and decodes `len` unsigned integers of `width` bytes
/// each, stored in `endian` order.
///
/// The file size must match `len * width` exactly. Widths up to 8 bytes are
/// supported; narrower values are zero-extended to `u64`.
pub fn load_array(path: &Path, width: u8, endian: Endian, len: u64) -> Result<Vec<u64>, Error> {
    if !(1..=8).contains(&width) {
        return Err(Error::InvalidWidth { width });
    }
    let width = width as usize;
    let expected = len as usize * width;

    let file = File::open(path)?;
    let actual = file.metadata()?.len() as usize;
    if actual != expected {
        return Err(Error::Assumption(format!(
            "{} holds {} bytes, expected {} ({} elements of {} bytes)",
            path.display(),
            actual,
            expected,
            len,
            width
        )));
    }
    if expected == 0 {
        // an edgeless graph has empty target files, which cannot be mapped
        return Ok(Vec::new());
    }

    let mmap = unsafe {
        memmap2::Mmap::map(&file).map_err(|source| Error::MemoryMap { source })?
    };
    let bytes: &[u8] = &mmap;
    // full-width arrays in host byte order are the common case and can be
    // reinterpreted wholesale; the mapping is page aligned
    if width == 8 && endian == host_endian() {
        let values = bytes
            .as_slice_of::<u64>()
            .map_err(|e| Error::Assumption(e.to_string()))?;
        return Ok(values.to_vec());
    }

    let mut values = Vec::with_capacity(len as usize);
    for element in bytes.chunks_exact(width) {
        values.push(decode(element, endian));
    }
    Ok(values)
}

const fn host_endian() -> Endian {
    if cfg!(target_endian = "big") {
        Endian::Big
    } else {
        Endian::Little
    }
}

#[inline]
fn decode(element: &[u8], endian: Endian) -> u64 {
    let mut buffer = [0u8; 8];
    match endian {
        Endian::Little => {
            buffer[..element.len()].copy_from_slice(element);
            u64::from_le_bytes(buffer)
        }
        Endian::Big => {
            buffer[8 - element.len()..].copy_from_slice(element);
            u64::from_be_bytes(buffer)
        }
    }
}
