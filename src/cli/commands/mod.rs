pub mod init;
pub mod which;

pub use init::*;
pub use which::*;
