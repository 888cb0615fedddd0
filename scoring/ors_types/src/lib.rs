// Domain types for opioid respiratory risk scoring
pub mod assessment;
pub mod error;
pub mod profile;
pub mod traits;
pub mod vitals;

pub use assessment::*;
pub use error::*;
pub use profile::*;
pub use traits::Validatable;
pub use vitals::*;
