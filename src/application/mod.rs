pub mod use_cases;

pub use use_cases::collections::CollectionService;
pub use use_cases::county_lookup::CountyLookupUseCase;
pub use use_cases::table_import::{ImportSummary, TableImporter};
