pub mod auth;
pub mod health;
pub mod member;
pub mod notification;
pub mod project;
pub mod role;
pub mod ticket;
pub mod user;
