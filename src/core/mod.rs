pub mod hypermedia;
pub mod runner;
pub mod uri_template;

pub use crate::domain::model::{Link, RelRequest, Resource, RunReport, Schema};
pub use crate::domain::ports::{ConfigProvider, Navigator, Scenario};
pub use crate::utils::error::Result;
