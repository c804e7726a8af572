pub mod color;
pub mod handle;
pub mod id;
pub mod profile;
pub mod session;
pub mod user;
