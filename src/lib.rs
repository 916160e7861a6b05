//! Glich - an embeddable script language for calendar arithmetic
//!
//! Glich scripts compute over integers, floats, text, day-count fields
//! and well-ordered range lists. The Hics extension adds calendar
//! schemes that convert day counts to and from dates in the Gregorian,
//! Julian, Hebrew, Islamic tabular, Chinese, French Republican and ISO
//! calendars.

pub mod error;
pub mod field;
pub mod function;
pub mod hics;
pub mod lexer;
pub mod mark;
pub mod phrase;
pub mod range;
pub mod runtime;
pub mod script;
pub mod store;
pub mod token;
pub mod value;

pub use error::{GlichError, Result};
pub use runtime::Runtime;
pub use value::Value;

/// Convenience function to run a script against a fresh runtime with
/// the calendar library loaded. Returns everything the script wrote,
/// diagnostics included.
pub fn run(source: &str) -> String {
    let mut rt = Runtime::new();
    rt.load_hics_library();
    rt.run_script(source)
}

/// Version of the Glich language
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
