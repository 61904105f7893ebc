pub mod engine;
pub mod error;
pub mod host;
pub mod lookup;
pub mod option_filter;
pub mod sequence;

#[cfg(test)]
pub mod test_support;

pub use engine::{Cascade, CascadeEvent, NodeOutcome};
pub use error::{CascadeError, LookupError};
pub use host::SelectorHost;
pub use lookup::{LookupRequest, OptionLookup};
pub use sequence::RequestSequence;
