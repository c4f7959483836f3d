/// Data structures for the swipe deck and the host's render arguments
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Frame height requested for image-card decks
pub const FRAME_HEIGHT_CARDS: u32 = 620;
/// Frame height for image-card decks with long descriptions
pub const FRAME_HEIGHT_CARDS_TALL: u32 = 750;
/// Frame height requested for table decks
pub const FRAME_HEIGHT_TABLE: u32 = 720;

/// Descriptions longer than this push the frame to the tall height
const LONG_DESCRIPTION_CHARS: usize = 120;

/// A single swipeable card, exactly as supplied by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Card {
    Row(RowCard),
    Image(ImageCard),
}

/// A picture with a caption
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageCard {
    pub image: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub pills: Value,
    /// Host keys the widget does not read, such as ids; returned untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ImageCard {
    pub fn new(image: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> ImageCard {
        ImageCard {
            image: image.into(),
            name: name.into(),
            description: description.into(),
            pills: Value::Null,
            extra: Map::new(),
        }
    }

    pub fn pill_labels(&self) -> Vec<String> {
        pill_labels(&self.pills)
    }
}

/// A reference to one row of the render's table data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowCard {
    pub row_index: usize,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_row: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    pub highlight_cells: Vec<HighlightRule>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    pub highlight_rows: Vec<HighlightRule>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    pub highlight_columns: Vec<HighlightRule>,
    #[serde(default, deserialize_with = "lenient_index", skip_serializing_if = "Option::is_none")]
    pub center_table_row: Option<usize>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub center_table_column: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub pills: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RowCard {
    pub fn new(row_index: usize, data: Value) -> RowCard {
        RowCard {
            row_index,
            data,
            table_row: None,
            name: None,
            description: None,
            highlight_cells: Vec::new(),
            highlight_rows: Vec::new(),
            highlight_columns: Vec::new(),
            center_table_row: None,
            center_table_column: None,
            pills: Value::Null,
            extra: Map::new(),
        }
    }

    /// Card heading, "Row N" (1-based) unless the host named the card
    pub fn title(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Row {}", self.row_index + 1))
    }

    pub fn subtitle(&self) -> &str {
        self.description
            .as_deref()
            .unwrap_or("Swipe to evaluate this data row")
    }

    pub fn pill_labels(&self) -> Vec<String> {
        pill_labels(&self.pills)
    }
}

/// Tag labels shown under a card's description
///
/// A list gives one pill per non-empty entry; a bare string gives one pill.
pub fn pill_labels(pills: &Value) -> Vec<String> {
    let labels = match pills {
        Value::Array(items) => items.iter().map(display_value).collect(),
        Value::Null => Vec::new(),
        other => vec![display_value(other)],
    };
    labels
        .into_iter()
        .map(|label| label.trim().to_string())
        .filter(|label| !label.is_empty())
        .collect()
}

/// Declarative highlight for a cell, a row or a column
///
/// Fields that cannot address anything (negative rows, odd column types)
/// read as absent, so the rule simply never matches.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HighlightRule {
    #[serde(default, deserialize_with = "lenient_index", skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    #[serde(default, deserialize_with = "lenient_column", skip_serializing_if = "Option::is_none")]
    pub column: Option<ColumnRef>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A column addressed by header name or by zero-based position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

impl ColumnRef {
    /// Position of the referenced column in `columns`, if it exists
    pub fn position(&self, columns: &[String]) -> Option<usize> {
        match self {
            ColumnRef::Index(i) => (*i < columns.len()).then_some(*i),
            ColumnRef::Name(name) => columns.iter().position(|c| c == name),
        }
    }
}

impl From<&str> for ColumnRef {
    fn from(name: &str) -> Self {
        ColumnRef::Name(name.to_string())
    }
}

/// Tabulated dataset shown behind row cards
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableData {
    #[serde(deserialize_with = "column_names")]
    pub columns: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub rows: Vec<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_rows: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_columns: Option<usize>,
}

impl TableData {
    /// Display text for a cell; absent and null values render empty
    pub fn cell_text(&self, row: usize, column: usize) -> String {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(display_value)
            .unwrap_or_default()
    }
}

/// Text for a JSON value as shown in a card; null renders empty
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Cards,
    Table,
}

/// Payload of one host render event
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RenderArgs {
    #[serde(default, deserialize_with = "nullable")]
    pub cards: Vec<Card>,
    #[serde(default)]
    pub table_data: Option<TableData>,
    #[serde(default, deserialize_with = "nullable")]
    pub highlight_cells: Vec<HighlightRule>,
    #[serde(default, deserialize_with = "nullable")]
    pub highlight_rows: Vec<HighlightRule>,
    #[serde(default, deserialize_with = "nullable")]
    pub highlight_columns: Vec<HighlightRule>,
    #[serde(default, deserialize_with = "nullable")]
    pub display_mode: DisplayMode,
    #[serde(
        default,
        rename = "centerTableRow",
        alias = "center_table_row",
        deserialize_with = "lenient_index"
    )]
    pub center_table_row: Option<usize>,
    #[serde(
        default,
        rename = "centerTableColumn",
        alias = "center_table_column",
        deserialize_with = "lenient_string"
    )]
    pub center_table_column: Option<String>,
}

impl RenderArgs {
    /// Height of the host frame for this render
    pub fn frame_height(&self) -> u32 {
        match self.display_mode {
            DisplayMode::Table => FRAME_HEIGHT_TABLE,
            DisplayMode::Cards => {
                let has_long_text = self.cards.iter().any(|card| match card {
                    Card::Image(img) => img.description.chars().count() > LONG_DESCRIPTION_CHARS,
                    Card::Row(_) => false,
                });
                if has_long_text {
                    FRAME_HEIGHT_CARDS_TALL
                } else {
                    FRAME_HEIGHT_CARDS
                }
            }
        }
    }
}

/// Treat an explicit `null` like a missing field
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Zero-based position from a JSON number; anything else reads as absent
fn index_of(value: &Value) -> Option<usize> {
    if let Some(i) = value.as_u64() {
        return usize::try_from(i).ok();
    }
    let f = value.as_f64()?;
    (f >= 0.0 && f.fract() == 0.0 && f <= usize::MAX as f64).then_some(f as usize)
}

fn lenient_index<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(index_of(&value))
}

fn lenient_column<'de, D>(deserializer: D) -> Result<Option<ColumnRef>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(name) => Some(ColumnRef::Name(name)),
        other => index_of(&other).map(ColumnRef::Index),
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// Dataframe headers may be numbers; keep them as strings
fn column_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<Value> = nullable(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|v| match v {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .collect())
}
