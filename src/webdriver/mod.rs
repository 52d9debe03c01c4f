pub mod scripts;
pub mod session;
pub mod snapshot;

pub use session::WebDriverHost;
pub use snapshot::{Command, PageSnapshot, SnapshotPage};
