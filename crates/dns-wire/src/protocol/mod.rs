pub mod deserialise;
pub mod query;
pub mod rdata;
pub mod serialise;
pub mod types;
