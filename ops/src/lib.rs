pub mod plan;
pub mod replace;
