// 评分制式转换
//
// 评分在内部统一以 0-100 的整数存储，显示时按用户选择的评分制式换算，
// 并按制式对应的步长（1、0.5、0.25、0.1）取整。

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 内部评分上限
pub const INTERNAL_RATING_MAX: i32 = 100;

/// 评分显示制式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RatingSystem {
    #[default]
    FiveStar,
    FivePointFiveStar,
    FivePointTwoFiveStar,
    TenStar,
    TenPointFiveStar,
    TenPointTwoFiveStar,
    TenPointDecimal,
}

impl RatingSystem {
    pub const ALL: [RatingSystem; 7] = [
        RatingSystem::FiveStar,
        RatingSystem::FivePointFiveStar,
        RatingSystem::FivePointTwoFiveStar,
        RatingSystem::TenStar,
        RatingSystem::TenPointFiveStar,
        RatingSystem::TenPointTwoFiveStar,
        RatingSystem::TenPointDecimal,
    ];

    /// 内部值与显示值之间的倍数
    fn scale(&self) -> f64 {
        match self {
            RatingSystem::FiveStar
            | RatingSystem::FivePointFiveStar
            | RatingSystem::FivePointTwoFiveStar => 20.0,
            RatingSystem::TenStar
            | RatingSystem::TenPointFiveStar
            | RatingSystem::TenPointTwoFiveStar
            | RatingSystem::TenPointDecimal => 10.0,
        }
    }

    /// 每个显示单位内的步数（步长的倒数）
    pub fn steps_per_unit(&self) -> u32 {
        match self {
            RatingSystem::FiveStar | RatingSystem::TenStar => 1,
            RatingSystem::FivePointFiveStar | RatingSystem::TenPointFiveStar => 2,
            RatingSystem::FivePointTwoFiveStar | RatingSystem::TenPointTwoFiveStar => 4,
            RatingSystem::TenPointDecimal => 10,
        }
    }

    /// 最大显示值（5 或 10）
    pub fn max_display(&self) -> u32 {
        (INTERNAL_RATING_MAX as f64 / self.scale()) as u32
    }

    /// 评分选择器可以产生的全部显示值
    pub fn picker_values(&self) -> Vec<f64> {
        let steps = self.steps_per_unit();
        (0..=self.max_display() * steps)
            .map(|k| k as f64 / steps as f64)
            .collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RatingSystem::FiveStar => "FIVE_STAR",
            RatingSystem::FivePointFiveStar => "FIVE_POINT_FIVE_STAR",
            RatingSystem::FivePointTwoFiveStar => "FIVE_POINT_TWO_FIVE_STAR",
            RatingSystem::TenStar => "TEN_STAR",
            RatingSystem::TenPointFiveStar => "TEN_POINT_FIVE_STAR",
            RatingSystem::TenPointTwoFiveStar => "TEN_POINT_TWO_FIVE_STAR",
            RatingSystem::TenPointDecimal => "TEN_POINT_DECIMAL",
        }
    }
}

impl FromStr for RatingSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RatingSystem::ALL
            .iter()
            .copied()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Invalid rating system: {}", s))
    }
}

/// 按步长取整
fn round_to_steps(value: f64, steps_per_unit: u32) -> f64 {
    let steps = steps_per_unit.max(1) as f64;
    (value * steps).round() / steps
}

/// 显示值 -> 内部 0-100 整数
pub fn display_to_internal(display: f64, system: RatingSystem) -> i32 {
    (display * system.scale()).round() as i32
}

/// 内部 0-100 整数 -> 显示值（按制式步长取整）
pub fn internal_to_display(internal: i32, system: RatingSystem) -> f64 {
    round_to_steps(internal as f64 / system.scale(), system.steps_per_unit())
}

/// 标签中使用的显示文本，去掉多余的小数位
pub fn format_display(internal: i32, system: RatingSystem) -> String {
    let display = internal_to_display(internal, system);
    if display.fract() == 0.0 {
        format!("{}", display as i64)
    } else {
        let text = format!("{:.2}", display);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
