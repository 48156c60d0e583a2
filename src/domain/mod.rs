pub mod disaster;
pub mod error;
