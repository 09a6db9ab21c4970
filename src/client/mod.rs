pub mod app;
pub mod draw;
pub mod http;
pub mod tui;

pub use app::{App, BackendEvent, View};
pub use http::{JobApiClient, JobBackend};
pub use tui::JobsTui;
