pub mod bar;
pub mod position;
pub mod transaction;
