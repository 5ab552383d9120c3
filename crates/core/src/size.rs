//! Human-readable byte sizes for log output

const KIB: u64 = 1024;
const MIB: u64 = KIB * 1024;
const GIB: u64 = MIB * 1024;
const TIB: u64 = GIB * 1024;

/// Format a byte count the way deploy progress is logged
///
/// Uses binary units with two decimals above 1 KiB, plain bytes below.
pub fn format_size(bytes: u64) -> String {
    let (unit, divisor) = match bytes {
        b if b >= TIB => ("TiB", TIB),
        b if b >= GIB => ("GiB", GIB),
        b if b >= MIB => ("MiB", MIB),
        b if b >= KIB => ("KiB", KIB),
        _ => return format!("{}B", bytes),
    };
    format!("{:.2}{}", bytes as f64 / divisor as f64, unit)
}
