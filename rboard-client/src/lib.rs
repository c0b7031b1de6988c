pub mod api;
pub mod board;
pub mod error;

pub use api::{BoardApi, ClientConfig, RestClient};
pub use board::drag::{DragController, DropOutcome};
pub use error::{ClientError, ClientResult};
