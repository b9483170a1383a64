pub mod coerce;
pub mod csv_reader;
pub mod error;
pub mod writer;

pub use coerce::{
    DATE_INPUT_FORMATS, coerce_value, parse_boolean, parse_date, parse_decimal, parse_integer,
};
pub use csv_reader::{Records, parse, parse_all, record_from_raw};
pub use error::{CodecError, Result};
pub use writer::{serialize_csv, serialize_json};
