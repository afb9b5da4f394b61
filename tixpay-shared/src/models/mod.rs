pub mod events;
pub mod order;
pub mod purchase;
pub mod ticket;
pub mod user;
