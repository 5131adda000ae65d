//! Per-sheet cursor and instruction accumulator
//!
//! A [`Sheet`] records textual instructions against a remote worksheet
//! handle named `sheet`. The last selected cell is held in a variable named
//! `cell`, so style calls such as [`Sheet::bg_color`] act on the cell that
//! was just written.
//!
//! ```
//! use sheetbridge_writer::{Sheet, SheetName, SheetOptions};
//!
//! let mut sheet = Sheet::new(SheetName::Active, SheetOptions::default());
//! sheet.row().cell("Name", None).number(42.0, None);
//! assert!(sheet.build(true).starts_with("function(sheet){var cell;"));
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use lazy_regex::regex_captures;

use crate::border::{BorderRegion, FILL_BORDER, FILL_BORDER_DEF};
use crate::codec::{
    chars_to_width, display_chars, js_number, js_string, px_to_width, range_ref, Rgb, Timestamp,
};
use crate::error::{Result, WriterError};
use crate::style::{BorderOptions, CellOptions, LineStyle, SheetOptions};

/// Display format used by [`Sheet::utc`] and [`Sheet::date`]
pub const DEFAULT_DATE_FORMAT: &str = "YYYY-MM-DD HH:mm:ss";

/// Number format suffix for currency cells
const CURRENCY_FORMAT: &str = "#,##0.00";

/// Number format for percent cells
const PERCENT_FORMAT: &str = "0.00%";

/// Multiplier from characters to width units outside pixel mode
const CHAR_WIDTH_RATIO: f64 = 1.8;

/// One textual operation against the remote sheet
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instruction(String);

impl Instruction {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Instruction {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// How a sheet is found in the remote document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SheetName {
    /// Whichever sheet is active when the plan runs
    Active,
    /// A sheet with this name, created when missing
    Named(String),
}

impl SheetName {
    pub fn as_named(&self) -> Option<&str> {
        match self {
            SheetName::Active => None,
            SheetName::Named(name) => Some(name),
        }
    }
}

impl fmt::Display for SheetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetName::Active => f.write_str("<active>"),
            SheetName::Named(name) => f.write_str(name),
        }
    }
}

/// A value to write into a cell
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellInput {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellInput {
    /// Text form of the value, or `None` for null
    pub fn render(&self) -> Option<String> {
        match self {
            CellInput::Null => None,
            CellInput::Bool(b) => Some(b.to_string()),
            CellInput::Number(n) => Some(js_number(*n)),
            CellInput::Text(s) => Some(s.clone()),
        }
    }
}

impl From<bool> for CellInput {
    fn from(b: bool) -> Self {
        CellInput::Bool(b)
    }
}

impl From<f64> for CellInput {
    fn from(n: f64) -> Self {
        CellInput::Number(n)
    }
}

impl From<f32> for CellInput {
    fn from(n: f32) -> Self {
        CellInput::Number(n as f64)
    }
}

impl From<i32> for CellInput {
    fn from(n: i32) -> Self {
        CellInput::Number(n as f64)
    }
}

impl From<i64> for CellInput {
    fn from(n: i64) -> Self {
        CellInput::Number(n as f64)
    }
}

impl From<u32> for CellInput {
    fn from(n: u32) -> Self {
        CellInput::Number(n as f64)
    }
}

impl From<usize> for CellInput {
    fn from(n: usize) -> Self {
        CellInput::Number(n as f64)
    }
}

impl From<&str> for CellInput {
    fn from(s: &str) -> Self {
        CellInput::Text(s.to_string())
    }
}

impl From<String> for CellInput {
    fn from(s: String) -> Self {
        CellInput::Text(s)
    }
}

impl From<&String> for CellInput {
    fn from(s: &String) -> Self {
        CellInput::Text(s.clone())
    }
}

impl<T: Into<CellInput>> From<Option<T>> for CellInput {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellInput::Null)
    }
}

/// Declared type of a cell value; decides how null is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Number,
    Boolean,
    Text,
    Date,
}

impl ValueType {
    fn null_text(ty: Option<ValueType>) -> &'static str {
        match ty {
            Some(ValueType::Number) => "0",
            Some(ValueType::Boolean) => "false",
            _ => "",
        }
    }
}

/// Options for a run of cells: one set for all, or one per position
#[derive(Debug, Clone, PartialEq)]
pub enum Layout {
    Shared(CellOptions),
    PerColumn(Vec<CellOptions>),
}

impl Layout {
    fn get(&self, index: usize) -> Option<&CellOptions> {
        match self {
            Layout::Shared(options) => Some(options),
            Layout::PerColumn(options) => options.get(index),
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Layout::Shared(CellOptions::default())
    }
}

impl From<CellOptions> for Layout {
    fn from(options: CellOptions) -> Self {
        Layout::Shared(options)
    }
}

impl From<Vec<CellOptions>> for Layout {
    fn from(options: Vec<CellOptions>) -> Self {
        Layout::PerColumn(options)
    }
}

/// Options for a batch helper such as [`Sheet::titles`]
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub layout: Layout,
    /// Start a new row first (default). A row is always started when the
    /// cursor has none yet.
    pub new_line: bool,
}

impl Batch {
    pub fn new(layout: impl Into<Layout>) -> Self {
        Self {
            layout: layout.into(),
            new_line: true,
        }
    }

    /// Continue on the current row
    pub fn inline(mut self) -> Self {
        self.new_line = false;
        self
    }
}

impl Default for Batch {
    fn default() -> Self {
        Batch::new(Layout::default())
    }
}

impl From<Layout> for Batch {
    fn from(layout: Layout) -> Self {
        Batch::new(layout)
    }
}

impl From<CellOptions> for Batch {
    fn from(options: CellOptions) -> Self {
        Batch::new(options)
    }
}

impl From<Vec<CellOptions>> for Batch {
    fn from(options: Vec<CellOptions>) -> Self {
        Batch::new(options)
    }
}

/// Instruction accumulator for one worksheet
#[derive(Debug, Clone)]
pub struct Sheet {
    origin: SheetName,
    name: SheetName,
    options: SheetOptions,
    row: i64,
    col: i64,
    max_col: i64,
    col_widths: HashMap<i64, f64>,
    helpers: BTreeMap<&'static str, &'static str>,
    instructions: Vec<Instruction>,
    /// Set by `end`, cleared by the next instruction
    ended: bool,
}

impl Sheet {
    /// Create an empty sheet. The cursor sits before the first row.
    pub fn new(name: SheetName, options: SheetOptions) -> Self {
        Self {
            origin: name.clone(),
            name,
            options,
            row: -1,
            col: -1,
            max_col: 0,
            col_widths: HashMap::new(),
            helpers: BTreeMap::new(),
            instructions: Vec::new(),
            ended: false,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Current name
    pub fn name(&self) -> &SheetName {
        &self.name
    }

    /// Name the sheet is resolved or created by when the plan runs
    pub fn origin(&self) -> &SheetName {
        &self.origin
    }

    pub fn options(&self) -> &SheetOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut SheetOptions {
        &mut self.options
    }

    /// Recorded instructions, in emission order
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Cursor row, -1 before the first row
    pub fn row_index(&self) -> i64 {
        self.row
    }

    /// Cursor column, i.e. the last written column, -1 at the start of a row
    pub fn col_index(&self) -> i64 {
        self.col
    }

    /// Widest column index seen so far
    pub fn max_col(&self) -> i64 {
        self.max_col
    }

    /// Width recorded for a column, explicit or inferred
    pub fn column_width(&self, col: u32) -> Option<f64> {
        self.col_widths.get(&(col as i64)).copied()
    }

    fn push(&mut self, instruction: String) {
        self.instructions.push(Instruction(instruction));
        self.ended = false;
    }

    fn track_max_col(&mut self) {
        if self.col > self.max_col {
            self.max_col = self.col;
        }
    }

    /// Cursor clamped into the sheet
    fn position(&self) -> (u32, u32) {
        (self.row.max(0) as u32, self.col.max(0) as u32)
    }

    // ========================================================================
    // Cursor
    // ========================================================================

    /// Start the next row
    pub fn row(&mut self) -> &mut Self {
        self.row_from(0)
    }

    /// Start the next row with the first cell at `start_col`
    pub fn row_from(&mut self, start_col: u32) -> &mut Self {
        self.track_max_col();
        self.row += 1;
        self.col = start_col as i64 - 1;
        self
    }

    /// Skip `rows` rows; the next cell lands in column 0
    pub fn skip_row(&mut self, rows: u32) -> &mut Self {
        self.skip_row_from(rows, 0)
    }

    /// Skip `rows` rows. A non-negative `cells` sets the next cell's column,
    /// a negative one moves the cursor column back by that many cells.
    pub fn skip_row_from(&mut self, rows: u32, cells: i64) -> &mut Self {
        self.track_max_col();
        self.row += rows as i64;
        if cells < 0 {
            self.col = (self.col + cells).max(-1);
        } else {
            self.col = cells - 1;
        }
        self
    }

    /// Leave `cells` cells empty on the current row
    pub fn skip_cell(&mut self, cells: u32) -> &mut Self {
        self.col += cells as i64;
        self
    }

    /// Move so the next cell is written at (`row`, `col`)
    pub fn go(&mut self, row: u32, col: u32) -> &mut Self {
        self.track_max_col();
        self.row = row as i64;
        self.col = col as i64 - 1;
        self
    }

    // ========================================================================
    // Cells
    // ========================================================================

    /// Write `value` into the next cell of the current row
    pub fn cell(&mut self, value: impl Into<CellInput>, options: Option<&CellOptions>) -> &mut Self {
        self.cell_full(value, options, None, None)
    }

    /// Write `value` with an explicit value type and number format.
    ///
    /// Writing before the first [`Sheet::row`] lands on row 0.
    pub fn cell_full(
        &mut self,
        value: impl Into<CellInput>,
        options: Option<&CellOptions>,
        ty: Option<ValueType>,
        format: Option<&str>,
    ) -> &mut Self {
        let value = value.into();
        if self.row < 0 {
            self.row = 0;
        }
        self.col += 1;
        let col = self.col;
        self.push(format!("cell = sheet.GetRangeByNumber({},{})", self.row, col));

        if let Some(format) = format {
            self.push(format!("cell.SetNumberFormat({})", js_string(format)));
        }

        let mut font_size = self.options.font_size;
        if let Some(options) = options {
            if let Some(alignment) = &options.alignment {
                if let Some(h) = alignment.horizontal {
                    self.push(format!("cell.SetAlignHorizontal({})", js_string(h.as_engine_str())));
                }
                if let Some(v) = alignment.vertical {
                    self.push(format!("cell.SetAlignVertical({})", js_string(v.as_engine_str())));
                }
            }
            if let Some(font) = &options.font {
                if let Some(name) = &font.name {
                    self.push(format!("cell.SetFontName({})", js_string(name)));
                }
                if let Some(size) = font.size {
                    font_size = size;
                    self.push(format!("cell.SetFontSize({})", js_number(size)));
                }
                if let Some(bold) = font.bold {
                    self.push(format!("cell.SetBold({})", bold));
                }
            }
            if let Some(width) = options.width {
                self.col_widths.insert(col, width);
                let width = self.convert_width(width, font_size);
                self.push(format!("cell.SetColumnWidth({})", js_number(width)));
            }
            if let Some(bg) = &options.bg_color {
                self.push(format!("cell.SetFillColor({})", Rgb::from_hex(bg).to_engine()));
            }
            if let Some(fg) = &options.fg_color {
                self.push(format!("cell.SetFontColor({})", Rgb::from_hex(fg).to_engine()));
            }
        }

        let text = value
            .render()
            .unwrap_or_else(|| ValueType::null_text(ty).to_string());

        if !self.col_widths.contains_key(&col) {
            let width = chars_to_width(display_chars(&text) as f64, font_size).max(0.0);
            self.col_widths.insert(col, width);
            self.push(format!("cell.SetColumnWidth({})", js_number(width)));
        }

        self.push(format!("cell.SetValue({})", js_string(&text)));
        self
    }

    /// Normalize a numeric input to text. Null becomes the NaN placeholder;
    /// text keeps its characters minus thousands separators.
    fn format_number(&self, value: CellInput, precision: Option<u32>) -> String {
        match value {
            CellInput::Null => self.options.nan.clone(),
            CellInput::Number(n) => match precision {
                Some(p) => format!("{:.*}", p as usize, n),
                None => js_number(n),
            },
            CellInput::Bool(b) => b.to_string(),
            CellInput::Text(s) => s.replace(',', ""),
        }
    }

    /// Write a number, or a plain cell when the value isn't numeric.
    /// Numbers are written as given; only `currency` and `percent` round.
    pub fn number(&mut self, value: impl Into<CellInput>, options: Option<&CellOptions>) -> &mut Self {
        let text = self.format_number(value.into(), None);
        let ty = is_number(&text).then_some(ValueType::Number);
        self.cell_full(text, options, ty, None)
    }

    pub fn boolean(&mut self, value: impl Into<CellInput>, options: Option<&CellOptions>) -> &mut Self {
        self.cell_full(value, options, Some(ValueType::Boolean), None)
    }

    pub fn string(&mut self, value: impl Into<CellInput>, options: Option<&CellOptions>) -> &mut Self {
        self.cell_full(value, options, Some(ValueType::Text), None)
    }

    /// Write a UTC instant as a date cell
    pub fn utc(
        &mut self,
        value: impl Into<Timestamp>,
        format: Option<&str>,
        options: Option<&CellOptions>,
    ) -> &mut Self {
        let serial = value.into().utc_serial();
        self.cell_full(
            serial,
            options,
            Some(ValueType::Date),
            Some(format.unwrap_or(DEFAULT_DATE_FORMAT)),
        )
    }

    /// Write a local wall-clock time as a date cell
    pub fn date(
        &mut self,
        value: impl Into<Timestamp>,
        format: Option<&str>,
        options: Option<&CellOptions>,
    ) -> &mut Self {
        let serial = value.into().local_serial();
        self.cell_full(
            serial,
            options,
            Some(ValueType::Date),
            Some(format.unwrap_or(DEFAULT_DATE_FORMAT)),
        )
    }

    /// Write a currency amount.
    ///
    /// With `currency` the format is `<currency>#,##0.00`. Without it a
    /// leading non-numeric prefix of the value (`€12`) becomes the symbol.
    pub fn currency(
        &mut self,
        value: impl Into<CellInput>,
        currency: Option<&str>,
        precision: Option<u32>,
        options: Option<&CellOptions>,
    ) -> &mut Self {
        let text = self.format_number(value.into(), precision.or(self.options.precision));

        if let Some(currency) = currency {
            let format = format!("{}{}", currency, CURRENCY_FORMAT);
            return self.cell_full(text, options, Some(ValueType::Number), Some(&format));
        }

        if let Some((_, symbol, amount)) = regex_captures!(r"^([^\d\-.]+)(.*)$", &text) {
            let format = format!("{}{}", symbol, CURRENCY_FORMAT);
            let amount = amount.to_string();
            return self.cell_full(amount, options, Some(ValueType::Number), Some(&format));
        }

        if !is_number(&text) {
            return self.cell_full(text, options, None, None);
        }
        self.cell_full(text, options, Some(ValueType::Number), Some(CURRENCY_FORMAT))
    }

    /// Write a ratio with a percent format
    pub fn percent(
        &mut self,
        value: impl Into<CellInput>,
        precision: Option<u32>,
        options: Option<&CellOptions>,
    ) -> &mut Self {
        let text = self.format_number(value.into(), precision.or(self.options.precision));
        if !is_number(&text) {
            return self.cell_full(text, options, None, None);
        }
        self.cell_full(text, options, Some(ValueType::Number), Some(PERCENT_FORMAT))
    }

    // ========================================================================
    // Batches
    // ========================================================================

    fn begin_batch(&mut self, batch: &Batch) {
        if self.row < 0 || batch.new_line {
            self.row();
        }
    }

    fn title_options(&self, options: Option<&CellOptions>) -> CellOptions {
        match (options, &self.options.title) {
            (Some(options), Some(base)) => options.merged_over(base),
            (Some(options), None) => options.clone(),
            (None, Some(base)) => base.clone(),
            (None, None) => CellOptions::default(),
        }
    }

    /// Write one title cell with the sheet's title style underneath `options`
    pub fn title(&mut self, value: impl Into<CellInput>, options: Option<&CellOptions>) -> &mut Self {
        let options = self.title_options(options);
        self.cell_full(value, Some(&options), Some(ValueType::Text), None)
    }

    /// Write a row of titles
    pub fn titles<I, V>(&mut self, values: I, batch: impl Into<Batch>) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellInput>,
    {
        let batch = batch.into();
        self.begin_batch(&batch);
        for (i, value) in values.into_iter().enumerate() {
            self.title(value, batch.layout.get(i));
        }
        self
    }

    /// Write a row of plain cells
    pub fn fill_row<I, V>(&mut self, values: I, batch: impl Into<Batch>) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellInput>,
    {
        let batch = batch.into();
        self.begin_batch(&batch);
        for (i, value) in values.into_iter().enumerate() {
            self.cell(value, batch.layout.get(i));
        }
        self
    }

    /// Write each data row on a new row
    pub fn fill<R, I, V>(&mut self, rows: R, layout: impl Into<Layout>) -> &mut Self
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = V>,
        V: Into<CellInput>,
    {
        let layout = layout.into();
        for values in rows {
            self.row();
            for (i, value) in values.into_iter().enumerate() {
                self.cell(value, layout.get(i));
            }
        }
        self
    }

    // ========================================================================
    // Widths and colors
    // ========================================================================

    fn convert_width(&self, width: f64, font_size: f64) -> f64 {
        if self.options.px {
            px_to_width(width)
        } else {
            chars_to_width(width, font_size)
        }
    }

    /// Set a column width. `None` targets the column of the last written cell.
    pub fn width(&mut self, width: f64, col: Option<u32>) -> &mut Self {
        let converted = js_number(self.convert_width(width, self.options.font_size));
        match col {
            Some(col) => {
                self.col_widths.insert(col as i64, width);
                self.push(format!("sheet.SetColumnWidth({},{})", col, converted));
            }
            None => {
                self.col_widths.insert(self.col, width);
                self.push(format!("cell.SetColumnWidth({})", converted));
            }
        }
        self
    }

    /// Set a column width from a character count
    pub fn ch_width(&mut self, chars: f64, col: Option<u32>) -> &mut Self {
        if self.options.px {
            self.width(chars, col)
        } else {
            self.width(chars * CHAR_WIDTH_RATIO, col)
        }
    }

    /// Set background and/or font color of the last written cell
    pub fn color(&mut self, bg: Option<&str>, fg: Option<&str>) -> &mut Self {
        if let Some(bg) = bg {
            self.bg_color(bg);
        }
        if let Some(fg) = fg {
            self.fg_color(fg);
        }
        self
    }

    pub fn bg_color(&mut self, color: &str) -> &mut Self {
        self.push(format!("cell.SetFillColor({})", Rgb::from_hex(color).to_engine()));
        self
    }

    pub fn fg_color(&mut self, color: &str) -> &mut Self {
        self.push(format!("cell.SetFontColor({})", Rgb::from_hex(color).to_engine()));
        self
    }

    // ========================================================================
    // Borders and merges
    // ========================================================================

    /// Border the rectangle (`rs`, `cs`)..=(`re`, `ce`).
    ///
    /// Color defaults to black and style to thin. See [`BorderOptions`] for
    /// the outer/inner modes.
    pub fn border(
        &mut self,
        rs: u32,
        cs: u32,
        re: u32,
        ce: u32,
        color: Option<&str>,
        style: Option<LineStyle>,
        options: &BorderOptions,
    ) -> &mut Self {
        self.helpers.entry(FILL_BORDER).or_insert(FILL_BORDER_DEF);
        let region = BorderRegion::new(rs, cs, re, ce);
        let color = color.map(Rgb::from_hex).unwrap_or(Rgb::BLACK);
        let style = style.unwrap_or_default();
        self.push(region.call(color, &style, options));
        self
    }

    /// Border from (`rs`, `cs`) to the current row and the widest column seen
    pub fn border_to_end(
        &mut self,
        rs: u32,
        cs: u32,
        color: Option<&str>,
        style: Option<LineStyle>,
        options: &BorderOptions,
    ) -> &mut Self {
        let re = self.row.max(0) as u32;
        let ce = self.col.max(self.max_col).max(0) as u32;
        self.border(rs, cs, re, ce, color, style, options)
    }

    /// Merge the rectangle (`rs`, `cs`)..=(`re`, `ce`)
    pub fn merge(&mut self, rs: u32, cs: u32, re: u32, ce: u32) -> &mut Self {
        let range = js_string(&range_ref(rs, cs, re, ce));
        self.push(format!("sheet.GetRange({}).Merge(false)", range));
        self
    }

    /// Merge the cursor cell with the next `cells` cells and move past them
    pub fn merge_cell(&mut self, cells: u32) -> Result<&mut Self> {
        let (row, col) = self.position();
        let end = col
            .checked_add(cells)
            .ok_or(WriterError::RangeOverflow { start: col, span: cells })?;
        self.merge(row, col, row, end);
        self.col += cells as i64;
        Ok(self)
    }

    /// Merge the cursor cell with the `rows` cells below it
    pub fn merge_row(&mut self, rows: u32) -> Result<&mut Self> {
        let (row, col) = self.position();
        let end = row
            .checked_add(rows)
            .ok_or(WriterError::RangeOverflow { start: row, span: rows })?;
        Ok(self.merge(row, col, end, col))
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Rename the sheet remotely.
    ///
    /// The emitted guard fails the replay when the remote document already
    /// has a sheet with that name. Use `Document::rename` to also check the
    /// sheets known locally.
    pub fn rename(&mut self, name: &str) -> &mut Self {
        if self.name.as_named() == Some(name) {
            return self;
        }
        let quoted = js_string(name);
        let message = js_string(&format!("Sheet with name [{}] already exists", name));
        self.push(format!("if(Api.GetSheet({})) throw new Error({})", quoted, message));
        self.push(format!("sheet.SetName({})", quoted));
        self.name = SheetName::Named(name.to_string());
        self
    }

    /// Reset cursor and widths and clear the remote used range
    pub fn clear(&mut self) -> &mut Self {
        self.row = -1;
        self.col = -1;
        self.max_col = 0;
        self.col_widths.clear();
        self.push("sheet.GetUsedRange().Clear()".to_string());
        self
    }

    /// Finish the sheet, drawing the configured border-to-end. Ending twice
    /// without writing in between is a no-op.
    pub fn end(&mut self) -> &mut Self {
        if self.ended {
            return self;
        }
        self.track_max_col();
        if self.row >= 0 {
            if let Some(border) = self.options.border_to_end.clone() {
                self.border_to_end(
                    0,
                    0,
                    Some(&border.color),
                    Some(border.style),
                    &BorderOptions::default(),
                );
            }
        }
        self.ended = true;
        self
    }

    /// Compile the sheet into one function taking the remote sheet handle
    pub fn build(&self, show_grid_lines: bool) -> String {
        let mut parts: Vec<&str> = self.helpers.values().copied().collect();
        parts.push("var cell");
        parts.extend(self.instructions.iter().map(Instruction::as_str));
        let grid_lines = format!("sheet.SetDisplayGridlines({})", show_grid_lines);
        parts.push(&grid_lines);
        format!("function(sheet){{{}}}", parts.join(";"))
    }
}

/// True when `text` parses as a finite number
fn is_number(text: &str) -> bool {
    text.trim()
        .parse::<f64>()
        .map(|n| n.is_finite())
        .unwrap_or(false)
}
