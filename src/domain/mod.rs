pub mod entities;
pub mod palette;
