pub mod gateway;
pub mod session;
