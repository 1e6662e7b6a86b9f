use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 125, g: 207, b: 255 };
pub const ACCENT: Color = Color::TrueColor { r: 255, g: 184, b: 108 };
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;
pub const IPV4_ADDR: Color = Color::TrueColor { r: 80, g: 250, b: 123 };
pub const IPV6_ADDR: Color = Color::TrueColor { r: 139, g: 233, b: 253 };
pub const PORT: Color = Color::TrueColor { r: 241, g: 250, b: 140 };
