//! 文件大小格式化.

/// 字节数单位, 按 1024 进位
const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// 将字节数格式化为带单位的可读字符串, 保留一位小数
///
/// 超过 GB 的数值仍以 GB 表示.
pub fn format_file_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut unit_index = 0;
    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }
    format!("{size:.1} {}", UNITS[unit_index])
}
