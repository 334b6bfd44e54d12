pub mod access;
pub mod auth;
pub mod notification;
pub mod project;
pub mod role;
pub mod ticket;
pub mod user;
