pub mod invitation;
pub mod mentor;
pub mod question_bank;
pub mod report;
pub mod response;
pub mod survey;
pub mod user;

pub use invitation::*;
pub use mentor::*;
pub use question_bank::*;
pub use report::*;
pub use response::*;
pub use survey::*;
pub use user::*;
