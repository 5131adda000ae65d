//! Cell style options and border line styles

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Border line styles understood by the engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LineStyle {
    /// No border
    None,
    /// Double line
    Double,
    /// Hair line (very thin)
    Hair,
    /// Dash-dot-dot
    DashDotDot,
    /// Dash-dot
    DashDot,
    /// Dotted line
    Dotted,
    /// Dashed line
    Dashed,
    /// Thin line
    #[default]
    Thin,
    /// Medium dash-dot-dot
    MediumDashDotDot,
    /// Slant dash-dot
    SlantDashDot,
    /// Medium dash-dot
    MediumDashDot,
    /// Medium dashed
    MediumDashed,
    /// Medium line
    Medium,
    /// Thick line
    Thick,
    /// A style name the engine may know but we don't; passed through verbatim
    Other(String),
}

impl LineStyle {
    /// Parse a style name case-insensitively. Unknown names become [`LineStyle::Other`].
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "none" => LineStyle::None,
            "double" => LineStyle::Double,
            "hair" => LineStyle::Hair,
            "dashdotdot" => LineStyle::DashDotDot,
            "dashdot" => LineStyle::DashDot,
            "dotted" => LineStyle::Dotted,
            "dashed" => LineStyle::Dashed,
            "thin" => LineStyle::Thin,
            "mediumdashdotdot" => LineStyle::MediumDashDotDot,
            "slantdashdot" => LineStyle::SlantDashDot,
            "mediumdashdot" => LineStyle::MediumDashDot,
            "mediumdashed" => LineStyle::MediumDashed,
            "medium" => LineStyle::Medium,
            "thick" => LineStyle::Thick,
            _ => LineStyle::Other(name.to_string()),
        }
    }

    /// The engine's name for this style
    pub fn as_engine_str(&self) -> &str {
        match self {
            LineStyle::None => "None",
            LineStyle::Double => "Double",
            LineStyle::Hair => "Hair",
            LineStyle::DashDotDot => "DashDotDot",
            LineStyle::DashDot => "DashDot",
            LineStyle::Dotted => "Dotted",
            LineStyle::Dashed => "Dashed",
            LineStyle::Thin => "Thin",
            LineStyle::MediumDashDotDot => "MediumDashDotDot",
            LineStyle::SlantDashDot => "SlantDashDot",
            LineStyle::MediumDashDot => "MediumDashDot",
            LineStyle::MediumDashed => "MediumDashed",
            LineStyle::Medium => "Medium",
            LineStyle::Thick => "Thick",
            LineStyle::Other(name) => name,
        }
    }
}

impl FromStr for LineStyle {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(LineStyle::parse(s))
    }
}

impl From<String> for LineStyle {
    fn from(s: String) -> Self {
        LineStyle::parse(&s)
    }
}

impl From<&str> for LineStyle {
    fn from(s: &str) -> Self {
        LineStyle::parse(s)
    }
}

impl From<LineStyle> for String {
    fn from(style: LineStyle) -> Self {
        style.as_engine_str().to_string()
    }
}

impl fmt::Display for LineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_engine_str())
    }
}

/// Horizontal alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
    Justify,
}

impl HorizontalAlign {
    pub fn as_engine_str(&self) -> &'static str {
        match self {
            HorizontalAlign::Left => "left",
            HorizontalAlign::Center => "center",
            HorizontalAlign::Right => "right",
            HorizontalAlign::Justify => "justify",
        }
    }
}

/// Vertical alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    Center,
    Bottom,
}

impl VerticalAlign {
    pub fn as_engine_str(&self) -> &'static str {
        match self {
            VerticalAlign::Top => "top",
            VerticalAlign::Center => "center",
            VerticalAlign::Bottom => "bottom",
        }
    }
}

/// Text alignment settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Alignment {
    pub horizontal: Option<HorizontalAlign>,
    pub vertical: Option<VerticalAlign>,
}

/// Font settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Font {
    /// Font family name
    pub name: Option<String>,
    /// Size in points. Also drives width inference for the cell.
    pub size: Option<f64>,
    pub bold: Option<bool>,
}

/// Per-cell style options.
///
/// Options are applied in a fixed order: alignment, font, width, fill
/// (background) and finally the font color.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CellOptions {
    pub alignment: Option<Alignment>,
    pub font: Option<Font>,
    /// Column width, in pixels or characters depending on the sheet mode
    pub width: Option<f64>,
    /// Background color as `#rrggbb`
    pub bg_color: Option<String>,
    /// Font color as `#rrggbb`
    pub fg_color: Option<String>,
}

impl CellOptions {
    /// Create empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Options carrying only a column width
    pub fn width(width: f64) -> Self {
        Self {
            width: Some(width),
            ..Self::default()
        }
    }

    /// Set horizontal alignment
    pub fn with_horizontal(mut self, align: HorizontalAlign) -> Self {
        self.alignment.get_or_insert_with(Alignment::default).horizontal = Some(align);
        self
    }

    /// Set vertical alignment
    pub fn with_vertical(mut self, align: VerticalAlign) -> Self {
        self.alignment.get_or_insert_with(Alignment::default).vertical = Some(align);
        self
    }

    /// Set the font family
    pub fn with_font_name(mut self, name: impl Into<String>) -> Self {
        self.font.get_or_insert_with(Font::default).name = Some(name.into());
        self
    }

    /// Set the font size
    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font.get_or_insert_with(Font::default).size = Some(size);
        self
    }

    /// Set bold
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.font.get_or_insert_with(Font::default).bold = Some(bold);
        self
    }

    /// Set the column width
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    /// Set the background color
    pub fn with_bg_color(mut self, color: impl Into<String>) -> Self {
        self.bg_color = Some(color.into());
        self
    }

    /// Set the font color
    pub fn with_fg_color(mut self, color: impl Into<String>) -> Self {
        self.fg_color = Some(color.into());
        self
    }

    /// Deep-merge `self` over `base`. Keys set in `self` win.
    pub fn merged_over(&self, base: &CellOptions) -> CellOptions {
        let alignment = match (&self.alignment, &base.alignment) {
            (Some(a), Some(b)) => Some(Alignment {
                horizontal: a.horizontal.or(b.horizontal),
                vertical: a.vertical.or(b.vertical),
            }),
            (a, b) => a.clone().or_else(|| b.clone()),
        };
        let font = match (&self.font, &base.font) {
            (Some(a), Some(b)) => Some(Font {
                name: a.name.clone().or_else(|| b.name.clone()),
                size: a.size.or(b.size),
                bold: a.bold.or(b.bold),
            }),
            (a, b) => a.clone().or_else(|| b.clone()),
        };
        CellOptions {
            alignment,
            font,
            width: self.width.or(base.width),
            bg_color: self.bg_color.clone().or_else(|| base.bg_color.clone()),
            fg_color: self.fg_color.clone().or_else(|| base.fg_color.clone()),
        }
    }

    /// Number of instructions these options contribute to a cell
    pub fn instruction_count(&self) -> usize {
        let alignment = self
            .alignment
            .as_ref()
            .map(|a| a.horizontal.is_some() as usize + a.vertical.is_some() as usize)
            .unwrap_or(0);
        let font = self
            .font
            .as_ref()
            .map(|f| f.name.is_some() as usize + f.size.is_some() as usize + f.bold.is_some() as usize)
            .unwrap_or(0);
        alignment
            + font
            + self.width.is_some() as usize
            + self.bg_color.is_some() as usize
            + self.fg_color.is_some() as usize
    }
}

impl From<f64> for CellOptions {
    fn from(width: f64) -> Self {
        CellOptions::width(width)
    }
}

/// Color/style override for one border layer (outer or inner)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderLayer {
    /// Color as `#rrggbb`; falls back to the call's base color
    pub color: Option<String>,
    /// Falls back to the call's base style
    pub style: Option<LineStyle>,
}

/// Which border layers a `border` call draws.
///
/// With neither layer set every cell gets all four sides.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderOptions {
    pub outer: Option<BorderLayer>,
    pub inner: Option<BorderLayer>,
}

impl BorderOptions {
    /// Perimeter only, using the base color/style
    pub fn outer() -> Self {
        Self {
            outer: Some(BorderLayer::default()),
            inner: None,
        }
    }

    /// Interior edges only, using the base color/style
    pub fn inner() -> Self {
        Self {
            outer: None,
            inner: Some(BorderLayer::default()),
        }
    }

    /// Both perimeter and interior edges
    pub fn outer_and_inner() -> Self {
        Self {
            outer: Some(BorderLayer::default()),
            inner: Some(BorderLayer::default()),
        }
    }
}

/// Border drawn over the used range when a sheet ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderToEnd {
    /// Color as `#rrggbb`
    pub color: String,
    pub style: LineStyle,
}

impl Default for BorderToEnd {
    fn default() -> Self {
        Self {
            color: "#000000".to_string(),
            style: LineStyle::Thin,
        }
    }
}

/// Defaults shared by the sheets of a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SheetOptions {
    /// Text written for a missing number
    pub nan: String,
    /// Interpret widths as pixels instead of characters
    pub px: bool,
    /// Default font size in points, used for width conversion
    pub font_size: f64,
    /// Default rounding precision for number/currency/percent
    pub precision: Option<u32>,
    /// Default style for title cells
    pub title: Option<CellOptions>,
    /// Border the used range when the sheet ends
    pub border_to_end: Option<BorderToEnd>,
    pub show_grid_lines: bool,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            nan: String::new(),
            px: false,
            font_size: 10.0,
            precision: None,
            title: None,
            border_to_end: None,
            show_grid_lines: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_line_style_parse() {
        assert_eq!(LineStyle::parse("thin"), LineStyle::Thin);
        assert_eq!(LineStyle::parse("DashDotDot"), LineStyle::DashDotDot);
        assert_eq!(LineStyle::parse("mediumdashed").as_engine_str(), "MediumDashed");
        assert_eq!(
            LineStyle::parse("Wavy"),
            LineStyle::Other("Wavy".to_string())
        );
        assert_eq!(LineStyle::parse("Wavy").to_string(), "Wavy");
    }

    #[test]
    fn test_merged_over_caller_wins() {
        let base = CellOptions::new()
            .with_bold(true)
            .with_font_size(12.0)
            .with_horizontal(HorizontalAlign::Center)
            .with_bg_color("#eeeeee");
        let caller = CellOptions::new()
            .with_font_size(14.0)
            .with_vertical(VerticalAlign::Top);

        let merged = caller.merged_over(&base);
        let font = merged.font.clone().unwrap();
        assert_eq!(font.size, Some(14.0));
        assert_eq!(font.bold, Some(true));
        let alignment = merged.alignment.clone().unwrap();
        assert_eq!(alignment.horizontal, Some(HorizontalAlign::Center));
        assert_eq!(alignment.vertical, Some(VerticalAlign::Top));
        assert_eq!(merged.bg_color.as_deref(), Some("#eeeeee"));
        assert_eq!(merged.instruction_count(), 5);
    }

    #[test]
    fn test_sheet_options_from_json() {
        let opts: SheetOptions = serde_json::from_str(
            r##"{"px": true, "fontSize": 12, "borderToEnd": {"style": "dashed"}}"##,
        )
        .unwrap();
        assert!(opts.px);
        assert_eq!(opts.font_size, 12.0);
        assert!(opts.show_grid_lines);
        let border = opts.border_to_end.unwrap();
        assert_eq!(border.style, LineStyle::Dashed);
        assert_eq!(border.color, "#000000");
    }
}
