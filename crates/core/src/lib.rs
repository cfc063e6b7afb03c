#![forbid(unsafe_code)]

pub mod error;
pub mod evaluate;
pub mod model;
pub mod normalize;
pub mod time;

pub use error::Error;
pub use evaluate::{Evaluation, evaluate};
pub use normalize::normalize_answer;
pub use time::Clock;
