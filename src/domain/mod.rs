pub mod collection;
pub mod error;
pub mod identifier;
pub mod lookup;
pub mod measure;
