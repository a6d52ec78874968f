//! Built-in field kinds
//!
//! Every kind implements `FieldKind`. Custom kinds live outside this module
//! and plug in the same way.

mod boolean;
pub(crate) mod datetime;
mod decimal;
mod dict;
mod embedded;
mod geo;
mod hash;
mod list;
mod number;
mod string;
mod uuid_field;

pub use boolean::BooleanField;
pub use datetime::{date_to_iso8601, iso8601_to_date, DateTimeField};
pub use decimal::{to_decimal, DecimalField};
pub use dict::{DictField, MultiValueDictField};
pub use embedded::EmbeddedField;
pub use geo::GeoPointField;
pub use hash::{HashAlgorithm, HashField};
pub use list::ListField;
pub use number::{NumberField, NumberType};
pub use string::{StringField, StringFormat};
pub use uuid_field::UuidField;
