pub mod error;
pub mod speedup;
pub mod timing;

pub use error::TableError;
pub use speedup::SpeedupTable;
pub use timing::{PolicySeries, TimingTable};
