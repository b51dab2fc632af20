//! 强类型单位系统
//!
//! 使用 NewType 模式防止弧度与角度混淆。运控模式以弧度通信，
//! 绝对位置模式和控制台输出以角度表示，换算只发生在这两个边界上。
//!
//! # 示例
//!
//! ```rust
//! use rmd_client::types::{Deg, Rad};
//!
//! let angle = Deg(45.0).to_rad();
//! assert!((angle.0 - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
//! assert!((angle.to_deg().0 - 45.0).abs() < 1e-12);
//! ```

/// 弧度（NewType）
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Rad(pub f64);

impl Rad {
    /// 转换为角度
    #[inline]
    pub fn to_deg(self) -> Deg {
        Deg(self.0.to_degrees())
    }
}

/// 角度（NewType）
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Deg(pub f64);

impl Deg {
    /// 转换为弧度
    #[inline]
    pub fn to_rad(self) -> Rad {
        Rad(self.0.to_radians())
    }
}
