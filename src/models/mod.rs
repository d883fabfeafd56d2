pub mod content;
pub mod request;
pub mod results;

pub use content::{ClassificationEntry, ContentItem, Instruction, InstructionMethod};
pub use request::{PerceptorRequest, RequestEnvelope};
pub use results::{
    group_by_instruction, DocumentImageResult, DocumentPageWithResult, InstructionWithOutcome,
    InstructionWithPageResult, InstructionWithResult,
};
