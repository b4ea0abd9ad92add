//! 도메인 타입 정의.

pub mod news;
pub mod prediction;
pub mod price;

pub use news::*;
pub use prediction::*;
pub use price::*;
