/// Highlight rule resolution for table cards
use std::collections::HashMap;

use serde::Serialize;

use crate::card::{HighlightRule, RenderArgs, RowCard, TableData};

/// Color sentinel that picks a swatch from `SWATCHES`
pub const RANDOM_COLOR: &str = "random";

/// Palette used for `"random"` highlights
pub const SWATCHES: [&str; 10] = [
    "#FFB6C1", // light pink
    "#98FB98", // pale green
    "#87CEEB", // sky blue
    "#DDA0DD", // plum
    "#F0E68C", // khaki
    "#FFA07A", // light salmon
    "#20B2AA", // light sea green
    "#FFE4B5", // moccasin
    "#D3D3D3", // light gray
    "#F5DEB3", // wheat
];

/// How much darker a highlight's border is than its fill
pub const BORDER_DARKEN_PERCENT: u8 = 20;

const CURRENT_ROW_BACKGROUND: &str = "rgba(0, 123, 255, 0.1)";
const CURRENT_ROW_BORDER: &str = "1px solid rgba(0, 123, 255, 0.3)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Cell,
    Row,
    Column,
}

impl RuleKind {
    fn default_color(&self) -> &'static str {
        match self {
            RuleKind::Cell => "#FFD700",
            RuleKind::Row => "#E3F2FD",
            RuleKind::Column => "#E8F5E8",
        }
    }

    fn border_width(&self) -> u8 {
        match self {
            RuleKind::Cell => 2,
            RuleKind::Row | RuleKind::Column => 1,
        }
    }

    fn font_weight(&self) -> &'static str {
        match self {
            RuleKind::Cell => "bold",
            RuleKind::Row | RuleKind::Column => "500",
        }
    }
}

/// Style descriptor in the shape the grid library's `cellStyle` expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellStyle {
    pub background_color: String,
    pub border: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<&'static str>,
}

impl CellStyle {
    fn for_rule(kind: RuleKind, color: &str) -> CellStyle {
        CellStyle {
            background_color: color.to_string(),
            border: format!(
                "{}px solid {}",
                kind.border_width(),
                darken_color(color, BORDER_DARKEN_PERCENT)
            ),
            font_weight: Some(kind.font_weight()),
        }
    }

    fn current_row() -> CellStyle {
        CellStyle {
            background_color: CURRENT_ROW_BACKGROUND.to_string(),
            border: CURRENT_ROW_BORDER.to_string(),
            font_weight: None,
        }
    }

    /// Inline CSS for the plain-table fallback
    pub fn to_css(&self) -> String {
        let mut css = format!(
            "background-color: {}; border: {};",
            self.background_color, self.border
        );
        if let Some(weight) = self.font_weight {
            css.push_str(&format!(" font-weight: {};", weight));
        }
        css
    }
}

/// The three rule lists that apply to one table card
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleSet {
    pub cells: Vec<HighlightRule>,
    pub rows: Vec<HighlightRule>,
    pub columns: Vec<HighlightRule>,
}

impl RuleSet {
    /// Render-level rules followed by the card's own
    pub fn for_card(args: &RenderArgs, card: &RowCard) -> RuleSet {
        let merge = |global: &[HighlightRule], local: &[HighlightRule]| {
            global.iter().chain(local).cloned().collect::<Vec<_>>()
        };

        RuleSet {
            cells: merge(&args.highlight_cells, &card.highlight_cells),
            rows: merge(&args.highlight_rows, &card.highlight_rows),
            columns: merge(&args.highlight_columns, &card.highlight_columns),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.rows.is_empty() && self.columns.is_empty()
    }
}

/// Precomputed `(row, column) -> style` lookup for one table card
///
/// Precedence is cell > row > column > current row. Within one list the
/// first matching rule wins. `"random"` colors are rolled once per rule
/// while the index is built, so a rule paints all of its cells alike.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightIndex {
    styles: HashMap<(usize, usize), CellStyle>,
    current_row: Option<usize>,
    current_style: CellStyle,
}

impl HighlightIndex {
    pub fn build(table: &TableData, rules: &RuleSet, current_row: Option<usize>) -> HighlightIndex {
        Self::build_with(table, rules, current_row, random_swatch)
    }

    /// Build with an explicit swatch picker for `"random"` rules
    pub fn build_with<F>(
        table: &TableData,
        rules: &RuleSet,
        current_row: Option<usize>,
        mut pick: F,
    ) -> HighlightIndex
    where
        F: FnMut() -> &'static str,
    {
        let n_rows = table.rows.len();
        let n_cols = table.columns.len();
        let mut styles = HashMap::new();

        // Lowest precedence first; earlier rules in a list are applied last.
        for rule in rules.columns.iter().rev() {
            let Some(col) = rule.column.as_ref().and_then(|c| c.position(&table.columns)) else {
                continue;
            };
            let style = CellStyle::for_rule(RuleKind::Column, &resolve_color(rule, RuleKind::Column, &mut pick));
            for row in 0..n_rows {
                styles.insert((row, col), style.clone());
            }
        }

        for rule in rules.rows.iter().rev() {
            let Some(row) = rule.row.filter(|r| *r < n_rows) else {
                continue;
            };
            let style = CellStyle::for_rule(RuleKind::Row, &resolve_color(rule, RuleKind::Row, &mut pick));
            for col in 0..n_cols {
                styles.insert((row, col), style.clone());
            }
        }

        for rule in rules.cells.iter().rev() {
            let Some(row) = rule.row.filter(|r| *r < n_rows) else {
                continue;
            };
            let Some(col) = rule.column.as_ref().and_then(|c| c.position(&table.columns)) else {
                continue;
            };
            let style = CellStyle::for_rule(RuleKind::Cell, &resolve_color(rule, RuleKind::Cell, &mut pick));
            styles.insert((row, col), style);
        }

        HighlightIndex {
            styles,
            current_row,
            current_style: CellStyle::current_row(),
        }
    }

    /// Style for a cell, if anything applies to it
    pub fn style(&self, row: usize, col: usize) -> Option<&CellStyle> {
        self.styles.get(&(row, col)).or_else(|| {
            (self.current_row == Some(row)).then_some(&self.current_style)
        })
    }

    pub fn current_row(&self) -> Option<usize> {
        self.current_row
    }

    /// All styled cells keyed `"{row}:{column name}"` for the grid bridge
    pub fn keyed_by_field(&self, table: &TableData) -> HashMap<String, CellStyle> {
        let mut keyed = HashMap::new();
        for row in 0..table.rows.len() {
            for (col, field) in table.columns.iter().enumerate() {
                if let Some(style) = self.style(row, col) {
                    keyed.insert(format!("{}:{}", row, field), style.clone());
                }
            }
        }
        keyed
    }
}

fn resolve_color<F>(rule: &HighlightRule, kind: RuleKind, pick: &mut F) -> String
where
    F: FnMut() -> &'static str,
{
    match rule.color.as_deref() {
        Some(RANDOM_COLOR) => pick().to_string(),
        Some(color) if !color.trim().is_empty() => color.to_string(),
        _ => kind.default_color().to_string(),
    }
}

/// One of the ten swatches, chosen by the browser's CSPRNG
pub fn random_swatch() -> &'static str {
    let mut buf = [0u8; 4];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => SWATCHES[u32::from_le_bytes(buf) as usize % SWATCHES.len()],
        Err(e) => {
            log::warn!("Random swatch unavailable: {}", e);
            SWATCHES[0]
        }
    }
}

/// Darken a hex color by subtracting `round(2.55 * percent)` per channel
///
/// Channels are clamped to 0..=255 and the result is lowercase `#rrggbb`.
/// `#rgb` shorthand is expanded first. Anything that is not a hex color
/// comes back unchanged.
pub fn darken_color(color: &str, percent: u8) -> String {
    let Some(rgb) = parse_hex(color) else {
        return color.to_string();
    };

    let amount = (2.55 * f64::from(percent)).round() as i32;
    let channel = |shift: u32| {
        let value = ((rgb >> shift) & 0xFF) as i32 - amount;
        value.clamp(0, 255) as u32
    };

    format!(
        "#{:06x}",
        (channel(16) << 16) | (channel(8) << 8) | channel(0)
    )
}

fn parse_hex(color: &str) -> Option<u32> {
    let hex = color.trim().strip_prefix('#')?;
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    u32::from_str_radix(&expanded, 16).ok()
}
