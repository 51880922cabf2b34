// Tabular source loaders for climate and discharge records

pub mod climate_loader;
pub mod discharge_loader;
pub mod error;
pub mod table;

// Re-export commonly used items
pub use climate_loader::{ClimateColumns, ClimateLoader};
pub use discharge_loader::{DischargeColumns, DischargeLoader};
pub use error::LoadError;
pub use table::{Cell, RawTable};
