pub mod collections;
pub mod county_lookup;
pub mod table_import;
