/// 计算小文件模块化评分
///
/// 返回小文件行数占总行数的百分比，保留两位小数（四舍五入，远离零）。
/// 总行数为 0 时评分为 0。
pub fn compute_grade(small_file_lines: u64, total_lines: u64) -> f64 {
    if total_lines == 0 {
        return 0.0;
    }

    let percent = small_file_lines as f64 / total_lines as f64 * 100.0;
    (percent * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_total_is_zero() {
        assert_eq!(compute_grade(0, 0), 0.0);
    }

    #[test]
    fn test_all_small_is_full_grade() {
        assert_eq!(compute_grade(321, 321), 100.0);
    }

    #[test]
    fn test_no_small_is_zero() {
        assert_eq!(compute_grade(0, 900), 0.0);
    }

    #[test]
    fn test_rounds_to_two_decimals() {
        assert_eq!(compute_grade(10, 210), 4.76);
        assert_eq!(compute_grade(1, 3), 33.33);
        assert_eq!(compute_grade(2, 3), 66.67);
    }

    #[test]
    fn test_grade_stays_in_range() {
        for total in 1..200u64 {
            for small in [0, total / 3, total / 2, total] {
                let grade = compute_grade(small, total);
                assert!((0.0..=100.0).contains(&grade));
            }
        }
    }
}
