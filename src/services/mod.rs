pub mod catalog;
pub mod enrichment;
pub mod generator;
pub mod interpreter;
pub mod llm;
pub mod providers;
pub mod ranking;
pub mod recommendations;

pub use catalog::{CatalogStore, InMemoryCatalogStore, PgCatalogStore};
pub use recommendations::Recommender;
