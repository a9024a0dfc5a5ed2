pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, FacilityData, load_facility_data};
