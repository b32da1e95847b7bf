pub mod export;
pub mod paginator;
pub mod parser;
pub mod projector;
#[cfg(feature = "remote")]
pub mod remote;
pub mod session;
pub mod source;
pub mod transformer;

pub use paginator::PageWindow;
pub use projector::Projection;
#[cfg(feature = "remote")]
pub use remote::SftpSource;
pub use session::{PageView, Session};
pub use source::{RemoteSource, fetch_in_background, read_local_text};
