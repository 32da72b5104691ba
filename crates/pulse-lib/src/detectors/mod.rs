pub mod beat;
pub mod contact;
