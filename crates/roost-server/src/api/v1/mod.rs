//! Version 1 of the public JSON API

pub mod auth;
pub mod booking;
pub mod business;
pub mod health;
pub mod product;
pub mod review;
pub mod route;
pub mod upload;
pub mod user;
