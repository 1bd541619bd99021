//! Helper functions for serialization & deserialization of the on-disk index.

use crate::error::*;
use bincode::{deserialize_from, serialize_into};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Parse an arbitrary `Deserialize` type from a file path.
pub fn from_file<T>(p: &str) -> SeedmapResult<T>
where
    T: serde::de::DeserializeOwned,
{
    let f = File::open(Path::new(p))?;
    let mut reader = BufReader::new(f);
    Ok(deserialize_from(&mut reader)?)
}

/// Write an arbitrary `Serialize` type to a file path.
pub fn write_to_file<T>(t: &T, p: &str) -> SeedmapResult<()>
where
    T: Serialize,
{
    let f = File::create(Path::new(p))?;
    let mut writer = BufWriter::new(f);
    Ok(serialize_into(&mut writer, t)?)
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{Rng, XorShiftRng};
    use std::collections::BTreeMap;
    use tempfile::NamedTempFile;

    quickcheck! {
        fn io_helpers(map: BTreeMap<String, String>) -> bool {
            let outfile = NamedTempFile::new().unwrap();
            let outfile = outfile.path().to_path_buf();
            let outfile = outfile.to_str().unwrap();

            write_to_file(&map, outfile).unwrap();
            let from_file: BTreeMap<String, String> = from_file(outfile).unwrap();

            map == from_file
        }
    }

    #[test]
    fn roundtrip_many_random_entries() {
        let mut rng = XorShiftRng::new_unseeded();
        let num_entries: usize = rng.gen_range(50, 200);

        let mut map = BTreeMap::new();
        for _ in 0..num_entries {
            let key_len: usize = rng.gen_range(1, 20);
            let val_len: usize = rng.gen_range(1, 20);
            let key: String = rng.gen_ascii_chars().take(key_len).collect();
            let val: String = rng.gen_ascii_chars().take(val_len).collect();
            map.insert(key, val);
        }

        let outfile = NamedTempFile::new().unwrap();
        let outfile = outfile.path().to_path_buf();
        let outfile = outfile.to_str().unwrap();

        write_to_file(&map, outfile).unwrap();
        let from_file: BTreeMap<String, String> = from_file(outfile).unwrap();

        assert_eq!(map, from_file);
    }
}
