pub mod commit;
pub mod deployment;
pub mod identity;
pub mod issue;
pub mod pull_request;

pub use commit::*;
pub use deployment::*;
pub use identity::*;
pub use issue::*;
pub use pull_request::*;
