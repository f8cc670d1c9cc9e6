//! Early rejection of automated-scanner traffic.
//!
//! Classification only looks at the request line and headers. The body is
//! never touched here, so a blocked request is answered before anything reads
//! it.

pub mod classifier;
pub mod context;
pub mod rules;
pub mod verdict;

pub use classifier::RequestClassifier;
pub use context::RequestContext;
pub use rules::RuleSet;
pub use verdict::Verdict;
