pub mod capture;
pub mod filter;
pub mod lcov;
pub mod summary;

// Re-export main functions
pub use capture::{Capturer, LcovCapturer, TracefileCapturer, find_trace_files};
pub use filter::{DEFAULT_EXCLUDES, ExclusionSet, filter_dataset};
pub use lcov::{parse_tracefile, read_tracefile, save_tracefile, write_tracefile};
pub use summary::{render_summary, summarize};
