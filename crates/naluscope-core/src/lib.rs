//! # naluscope-core
//!
//! naluscope 核心库, 提供错误类型、有理数帧率与格式化工具.

pub mod error;
pub mod rational;
pub mod size;

// 重导出常用类型
pub use error::{ScopeError, ScopeResult};
pub use rational::Rational;
pub use size::format_file_size;
