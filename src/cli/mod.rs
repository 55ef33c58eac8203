pub mod info;
pub mod process;
pub mod recover;

pub use info::*;
pub use process::*;
pub use recover::*;
