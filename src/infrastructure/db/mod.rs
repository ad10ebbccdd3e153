pub mod facts;
pub mod sqlite;
