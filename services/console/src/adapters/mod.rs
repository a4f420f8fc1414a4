pub mod http;
pub mod layers;
pub mod pdf;
pub mod records;
