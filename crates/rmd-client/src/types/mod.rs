//! 强类型单位

pub mod units;

pub use units::{Deg, Rad};
