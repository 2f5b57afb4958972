pub mod image;
pub mod items;
