pub mod dispatch;
pub mod supervisor;
pub mod table;
