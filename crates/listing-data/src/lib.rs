//! Listing Data
//!
//! Raw marketplace rows, the cleaning pass that turns them into
//! [`ListingRecord`]s, the yearly inflation table, and the reference catalog
//! used to populate brand / location / model pickers.

mod catalog;
mod cleaning;
mod error;
mod inflation;
mod io;
mod parse;
mod record;

pub use catalog::{ReferenceCatalog, OWNER_BRACKETS};
pub use cleaning::{Cleaner, CleaningConfig, CleaningReport, CleanedListings};
pub use error::ListingError;
pub use inflation::{InflatedListing, InflationTable, MissingInflationPolicy};
pub use io::{read_raw_listings, read_raw_listings_from, read_records, read_records_from};
pub use parse::{parse_mileage, parse_price, parse_year};
pub use record::{ListingRecord, RawListing};
