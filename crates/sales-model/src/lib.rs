pub mod decision;
pub mod error;
pub mod record;
pub mod report;
pub mod schema;
pub mod value;

pub use decision::{Decision, DropReason, RuleId};
pub use error::{Result, SchemaError};
pub use record::{ParseDiagnostic, RawRow, Record};
pub use report::{CleaningReport, DropEvent};
pub use schema::{FieldDef, FieldType, Schema, fields};
pub use value::{DATE_OUTPUT_FORMAT, Value};
