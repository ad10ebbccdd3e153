// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// CSV decoding and record iteration for table imports

mod csv_source;

pub use csv_source::{CsvRecords, CsvSource};
