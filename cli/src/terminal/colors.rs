use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 94, g: 186, b: 255 };
pub const ACCENT: Color = Color::TrueColor { r: 255, g: 184, b: 108 };
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;
pub const IPV4_ADDR: Color = Color::TrueColor { r: 137, g: 221, b: 255 };
pub const IPV6_ADDR: Color = Color::TrueColor { r: 199, g: 146, b: 234 };

pub const HEALTHY: Color = Color::Green;
pub const DEGRADED: Color = Color::Yellow;
pub const UNREACHABLE: Color = Color::Red;
