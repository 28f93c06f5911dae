//! Export of scenarios and curricula.
//!
//! Converts scenarios into fine-tuning formats and writes curricula to disk.

pub mod formats;
pub mod writer;

pub use formats::{
    convert, convert_batch, reasoning_narrative, to_alpaca, to_openai_chat, to_simple_qa,
    to_thought_process, AlpacaEntry, ChatExample, ChatMessage, SimpleQa, ThoughtProcess,
    TrainingFormat, CHAT_SYSTEM_PROMPT,
};
pub use writer::{
    read_scenarios, write_records, CurriculumExport, CurriculumMetadata, CurriculumWriter,
};
