//! Bincode persistence for generated magic tables. Generation is
//! deterministic, so the cache is purely a startup-time optimisation; with
//! the `load_magic` feature the global accessor tries the cache file first.

use std::fs;
use std::path::Path;

use super::structs::MagicTables;

pub const DEFAULT_CACHE_PATH: &str = "magics.bin";

pub fn save_to_file<P: AsRef<Path>>(tables: &MagicTables, path: P) -> Result<(), String> {
    let bytes = bincode::serialize(tables).map_err(|e| format!("serialize magics: {e}"))?;
    fs::write(path, bytes).map_err(|e| format!("write magics: {e}"))
}

pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<MagicTables, String> {
    let bytes = fs::read(path).map_err(|e| format!("read magics: {e}"))?;
    bincode::deserialize(&bytes).map_err(|e| format!("deserialize magics: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::magic::generate_magic_tables;

    #[test]
    fn bincode_round_trip_preserves_tables() {
        let tables = generate_magic_tables();
        let bytes = bincode::serialize(&tables).unwrap();
        let back: MagicTables = bincode::deserialize(&bytes).unwrap();
        assert_eq!(tables, back);
    }
}
