pub mod item_form;

pub use item_form::ItemForm;
