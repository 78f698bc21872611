//! Domain layer for the placement corpus: catalogs, the synthetic record
//! generator, and the validation rules behind the dashboard views.

pub mod catalog;
pub mod dashboard;
pub mod generator;
pub mod ids;
pub mod types;

pub use generator::RecordGenerator;
pub use ids::{IdCounters, IdError, RecordIds, ID_COUNTER_BASE};
