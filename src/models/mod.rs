pub mod enums;
pub mod inbox;
pub mod lab_test;
pub mod patient;
pub mod test_result;
pub mod user;

pub use enums::*;
pub use inbox::*;
pub use lab_test::*;
pub use patient::*;
pub use test_result::*;
pub use user::*;
