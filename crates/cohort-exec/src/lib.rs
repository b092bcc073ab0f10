mod error;
pub use error::{ExecError, ExecResult};

mod util;

#[cfg(feature = "proc")]
pub mod proc;
#[cfg(feature = "proc")]
pub use proc::{ProcConfig, ProcRunner};

pub mod prelude {
    #[cfg(feature = "proc")]
    pub use crate::{ProcConfig, ProcRunner};
    pub use crate::error::{ExecError, ExecResult};
}
