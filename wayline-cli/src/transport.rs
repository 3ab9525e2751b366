pub mod address;
pub mod bridge;
pub mod session;
