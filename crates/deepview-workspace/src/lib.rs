pub mod error;
pub mod paths;
pub mod uploads;
pub mod workspace;

pub use error::*;
pub use uploads::*;
pub use workspace::*;
