pub mod fanout;
pub mod permissions;
