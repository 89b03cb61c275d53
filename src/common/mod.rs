pub mod config;
pub mod error;
pub(crate) mod markup;
pub mod receiver;

pub use config::{Alerts, Config, DetectorFactory, FunIds, Widget};
pub use error::{QrioError, QrioResult};
pub use receiver::Receiver;
