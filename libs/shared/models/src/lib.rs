pub mod appointment;
pub mod auth;
pub mod error;
pub mod membership;
pub mod notification;
pub mod response;
pub mod review;
pub mod user;
