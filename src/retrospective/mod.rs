pub mod overstaff;

pub use overstaff::{overstaff_assessment, OverstaffAssessment};
