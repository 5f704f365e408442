//! Plugin API for sift record processors: the change-event envelope,
//! the dynamic value model, and the FFI surface the engine host loads.

pub mod config;
pub mod error;
pub mod ffi;
pub mod processor;
pub mod record;
pub mod value;

pub use error::ProcessorError;
pub use processor::RecordProcessor;
pub use record::{Data, Operation, Payload, Record};
pub use value::{StructuredData, Value};
