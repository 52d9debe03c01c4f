pub mod classifier;
pub mod signals;

pub use classifier::{classify, Verdict};
pub use signals::{read_evidence, AdEvidence};
