mod requests_logging;

pub use requests_logging::{log_requests, tag_matched_path, RequestsLoggingLevel, UNMATCHED_ROUTE};
