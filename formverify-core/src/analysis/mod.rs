pub mod bbox;
pub mod roles;
