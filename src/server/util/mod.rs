pub mod pagination;
pub mod phone;
