//! 值编解码
//!
//! 纯函数，把 gNMI 路径、TypedValue、定点小数和 JSON 负载转换为文本。
//! 输出格式需要与下游已有数据逐字节兼容。

mod json;
mod number;
mod path;
mod value;

pub use json::format_json;
pub use number::{format_decimal, format_f32, format_f64, MAX_DECIMAL_PRECISION};
pub use path::{escape_key, escape_name, escape_value, format_path, join_path};
pub use value::{format_leaflist, format_typed_value, format_update_value};
