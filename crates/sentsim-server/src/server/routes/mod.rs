pub mod default;
pub mod similarity;
