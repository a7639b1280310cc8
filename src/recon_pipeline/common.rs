pub mod error;

pub use error::{ErrorKind, ProcessError, Result};
