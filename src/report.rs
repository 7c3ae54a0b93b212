pub mod coveralls;

pub use coveralls::{CoverallsPayload, CoverallsSourceFile, ServiceInfo, to_coveralls};
