pub mod blob;
pub mod department;
pub mod report;

pub use blob::BlobRef;
pub use department::{department_label, Department};
pub use report::{DefectReport, NewDefectReport, ValidationError};
