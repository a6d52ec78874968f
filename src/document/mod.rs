//! Document subsystem for docshield
//!
//! - `Document`: values of one schema, with native and wire exports
//! - `Validator`: full and partial validation of candidate mappings
//! - projections: owner-safe and public-safe filtering for transmission

mod instance;
mod projection;
mod validator;

pub use instance::Document;
pub use projection::{
    make_json_ownersafe, make_json_publicsafe, make_ownersafe, make_publicsafe, SafeInput,
    SafeOutput,
};
pub use validator::{ValidationReport, Validator};
