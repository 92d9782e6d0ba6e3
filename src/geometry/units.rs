//! Fixed-point units used throughout the checker
//!
//! Every dimension is an integer number of nanometers, ratios are parts per
//! million and angles are micro-degrees. Pass/fail decisions only ever
//! compare these integers; `f64` appears only for trigonometry and display.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

const NM_PER_MM: i64 = 1_000_000;
const PPM_PER_UNIT: i64 = 1_000_000;
const MICRODEG_PER_DEG: i64 = 1_000_000;

/// A signed length in nanometers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Length(i64);

impl Length {
    pub const ZERO: Length = Length(0);

    pub const fn from_nm(nm: i64) -> Self {
        Length(nm)
    }

    /// Convert from millimeters, rounding to the nearest nanometer
    pub fn from_mm(mm: f64) -> Self {
        Length((mm * NM_PER_MM as f64).round() as i64)
    }

    pub const fn nm(self) -> i64 {
        self.0
    }

    pub fn to_mm(self) -> f64 {
        self.0 as f64 / NM_PER_MM as f64
    }

    pub fn abs(self) -> Self {
        Length(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Multiply by a ratio, rounding half away from zero
    pub fn scaled(self, ratio: Ratio) -> Self {
        let product = self.0 as i128 * ratio.ppm() as i128;
        let denom = PPM_PER_UNIT as i128;
        let half = denom / 2;
        let rounded = if product >= 0 {
            (product + half) / denom
        } else {
            (product - half) / denom
        };
        Length(rounded as i64)
    }

    /// Millimeters with up to six decimals and no trailing zeros, e.g. `0.15mm`
    pub fn to_mm_string(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let int = abs / NM_PER_MM as u64;
        let frac = abs % NM_PER_MM as u64;
        if frac == 0 {
            format!("{}{}mm", sign, int)
        } else {
            let digits = format!("{:06}", frac);
            format!("{}{}.{}mm", sign, int, digits.trim_end_matches('0'))
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_mm_string())
    }
}

impl Add for Length {
    type Output = Length;
    fn add(self, rhs: Length) -> Length {
        Length(self.0 + rhs.0)
    }
}

impl Sub for Length {
    type Output = Length;
    fn sub(self, rhs: Length) -> Length {
        Length(self.0 - rhs.0)
    }
}

impl AddAssign for Length {
    fn add_assign(&mut self, rhs: Length) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Length {
    fn sub_assign(&mut self, rhs: Length) {
        self.0 -= rhs.0;
    }
}

impl Neg for Length {
    type Output = Length;
    fn neg(self) -> Length {
        Length(-self.0)
    }
}

impl Mul<i64> for Length {
    type Output = Length;
    fn mul(self, rhs: i64) -> Length {
        Length(self.0 * rhs)
    }
}

impl Div<i64> for Length {
    type Output = Length;
    fn div(self, rhs: i64) -> Length {
        Length(self.0 / rhs)
    }
}

/// A ratio in parts per million (`1_000_000` = 100%)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ratio(i64);

impl Ratio {
    pub const ZERO: Ratio = Ratio(0);

    pub const fn from_ppm(ppm: i64) -> Self {
        Ratio(ppm)
    }

    pub fn from_percent(percent: f64) -> Self {
        Ratio((percent * (PPM_PER_UNIT / 100) as f64).round() as i64)
    }

    pub const fn ppm(self) -> i64 {
        self.0
    }

    pub fn to_percent(self) -> f64 {
        self.0 as f64 / (PPM_PER_UNIT / 100) as f64
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.to_percent())
    }
}

/// An angle in micro-degrees, counter-clockwise positive
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Angle(i64);

impl Angle {
    pub const ZERO: Angle = Angle(0);
    pub const DEG90: Angle = Angle(90 * MICRODEG_PER_DEG);
    pub const DEG180: Angle = Angle(180 * MICRODEG_PER_DEG);

    pub const fn from_microdeg(microdeg: i64) -> Self {
        Angle(microdeg)
    }

    pub fn from_deg(deg: f64) -> Self {
        Angle((deg * MICRODEG_PER_DEG as f64).round() as i64)
    }

    pub const fn microdeg(self) -> i64 {
        self.0
    }

    pub fn to_deg(self) -> f64 {
        self.0 as f64 / MICRODEG_PER_DEG as f64
    }

    pub fn to_rad(self) -> f64 {
        self.to_deg().to_radians()
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Normalized into `[0°, 360°)`
    pub fn normalized(self) -> Self {
        Angle(self.0.rem_euclid(360 * MICRODEG_PER_DEG))
    }
}

impl Add for Angle {
    type Output = Angle;
    fn add(self, rhs: Angle) -> Angle {
        Angle(self.0 + rhs.0)
    }
}

impl Sub for Angle {
    type Output = Angle;
    fn sub(self, rhs: Angle) -> Angle {
        Angle(self.0 - rhs.0)
    }
}

impl Neg for Angle {
    type Output = Angle;
    fn neg(self) -> Angle {
        Angle(-self.0)
    }
}

/// A point on the board in nanometers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: Length,
    pub y: Length,
}

impl Point {
    pub const fn new(x: Length, y: Length) -> Self {
        Self { x, y }
    }

    pub const fn from_nm(x: i64, y: i64) -> Self {
        Self {
            x: Length::from_nm(x),
            y: Length::from_nm(y),
        }
    }

    pub fn from_mm(x: f64, y: f64) -> Self {
        Self::new(Length::from_mm(x), Length::from_mm(y))
    }

    /// Round a floating point coordinate pair onto the nanometer grid
    pub fn from_f64(x: f64, y: f64) -> Self {
        Self::from_nm(x.round() as i64, y.round() as i64)
    }

    pub fn to_f64(self) -> (f64, f64) {
        (self.x.nm() as f64, self.y.nm() as f64)
    }

    /// Mirror at the vertical axis (x becomes -x)
    pub fn mirrored(self) -> Self {
        Self::new(-self.x, self.y)
    }

    /// Rotate around the origin. Multiples of 90° are exact.
    pub fn rotated(self, angle: Angle) -> Self {
        let (x, y) = (self.x.nm(), self.y.nm());
        match angle.normalized().microdeg() {
            0 => self,
            90_000_000 => Self::from_nm(-y, x),
            180_000_000 => Self::from_nm(-x, -y),
            270_000_000 => Self::from_nm(y, -x),
            _ => {
                let (sin, cos) = angle.to_rad().sin_cos();
                let (fx, fy) = self.to_f64();
                Self::from_f64(fx * cos - fy * sin, fx * sin + fy * cos)
            }
        }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        let (ax, ay) = self.to_f64();
        let (bx, by) = other.to_f64();
        (bx - ax).hypot(by - ay)
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}
