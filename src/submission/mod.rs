pub mod parser;
pub mod pipeline;

pub use parser::{parse_intake, Intake, IntakeUpload};
