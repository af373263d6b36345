pub mod clinical_case;
pub mod enums;
pub mod patient;
pub mod prescription;
pub mod profile;
pub mod remedy;
pub mod rubric;

pub use clinical_case::*;
pub use patient::*;
pub use prescription::*;
pub use profile::*;
pub use remedy::*;
pub use rubric::*;
