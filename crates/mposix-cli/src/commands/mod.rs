pub mod call;
pub mod mode;
pub mod ops;
