//! `SeaORM` Entity definitions

pub mod prelude;

pub mod bookings;
pub mod businesses;
pub mod products;
pub mod reviews;
pub mod users;
