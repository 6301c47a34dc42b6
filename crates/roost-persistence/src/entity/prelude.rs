//! `SeaORM` Entity prelude

pub use super::bookings::Entity as Bookings;
pub use super::businesses::Entity as Businesses;
pub use super::products::Entity as Products;
pub use super::reviews::Entity as Reviews;
pub use super::users::Entity as Users;
