//! CSV Loading

use crate::error::ListingError;
use crate::record::{ListingRecord, RawListing};
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Read raw listings from any CSV source
pub fn read_raw_listings_from<R: Read>(reader: R) -> Result<Vec<RawListing>, ListingError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let rows = csv_reader
        .deserialize::<RawListing>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Read raw listings from a CSV file
pub fn read_raw_listings<P: AsRef<Path>>(path: P) -> Result<Vec<RawListing>, ListingError> {
    let path = path.as_ref();
    let rows = read_raw_listings_from(std::fs::File::open(path)?)?;
    info!("Loaded {} raw listings from {}", rows.len(), path.display());
    Ok(rows)
}

/// Read already-cleaned records; every row must be complete
pub fn read_records_from<R: Read>(reader: R) -> Result<Vec<ListingRecord>, ListingError> {
    read_raw_listings_from(reader)?
        .iter()
        .enumerate()
        .map(|(i, row)| {
            row.parse().map_err(|e| {
                ListingError::InvalidFormat(format!("row {}: {}", i + 1, e))
            })
        })
        .collect()
}

/// Read already-cleaned records from a CSV file
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<ListingRecord>, ListingError> {
    let path = path.as_ref();
    let records = read_records_from(std::fs::File::open(path)?)?;
    info!("Loaded {} listing records from {}", records.len(), path.display());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRAPED: &str = "\
Judul,Merek,Model_Detail,Harga,Tahun,Kilometer,Lokasi,SumberURL
Toyota Avanza G,Toyota,Avanza G,Rp 150.000.000,2018,50.000 km,Jakarta,https://example.test/1
Honda Brio,Honda,Brio,,2020,12000,Bandung,https://example.test/2
";

    #[test]
    fn test_raw_rows_keep_gaps() {
        let rows = read_raw_listings_from(SCRAPED.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].brand.as_deref(), Some("Toyota"));
        assert!(rows[1].price.is_none());
        assert!(rows[0].owner.is_none());
    }

    #[test]
    fn test_records_require_complete_rows() {
        let err = read_records_from(SCRAPED.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn test_records_ignore_extra_columns() {
        let derived = "\
Judul,Merek,Model_Detail,Harga,Tahun,Kilometer,Lokasi,UsiaMobil,Inflasi
Toyota Avanza G,Toyota,Avanza G,150000000,2018,50000,Jakarta,7,0.0313
";
        let records = read_records_from(derived.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].price, 150_000_000);
    }

    #[test]
    fn test_read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listings.csv");
        std::fs::write(&path, SCRAPED).unwrap();
        assert_eq!(read_raw_listings(&path).unwrap().len(), 2);
    }
}
