//! Chart and table rendering.
//!
//! Pure presentation: a shaped table plus a chart kind and style become a
//! Vega-Lite v5 spec (inline data) or a string grid. Nothing here computes
//! over the data, and an empty table renders as an empty chart.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::DashResult;

pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";
const PIE_OUTER_RADIUS: f64 = 180.0;
const EMPTY_SUBTITLE: &str = "No data for the current selection";

/// Shaped rows ready for presentation, one JSON object per row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShapedTable {
    pub records: Vec<Value>,
}

impl ShapedTable {
    pub fn from_rows<T: Serialize>(rows: &[T]) -> DashResult<Self> {
        let records = rows
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { records })
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Column names across all records. Objects carry no field order, so
    /// this is alphabetical within each record.
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for record in &self.records {
            if let Value::Object(map) = record {
                for key in map.keys() {
                    if !columns.iter().any(|c| c == key) {
                        columns.push(key.clone());
                    }
                }
            }
        }
        columns
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartKind {
    /// Donut when `hole > 0`.
    Pie {
        category: String,
        value: String,
        hole: f64,
    },
    Line {
        x: String,
        y: String,
        series: String,
        marker_size: u32,
    },
    Bar {
        x: String,
        y: String,
    },
    /// One bar per measure, side by side within each category.
    GroupedBar {
        x: String,
        measures: Vec<String>,
    },
    /// Measures drawn over each other on horizontal bars.
    HorizontalOverlayBar {
        y: String,
        measures: Vec<String>,
    },
}

impl ChartKind {
    /// Fields the chart encodes, in reading order for tabular output.
    pub fn columns(&self) -> Vec<String> {
        match self {
            ChartKind::Pie { category, value, .. } => vec![category.clone(), value.clone()],
            ChartKind::Line { x, y, series, .. } => vec![series.clone(), x.clone(), y.clone()],
            ChartKind::Bar { x, y } => vec![x.clone(), y.clone()],
            ChartKind::GroupedBar { x: key, measures }
            | ChartKind::HorizontalOverlayBar { y: key, measures } => {
                std::iter::once(key.clone()).chain(measures.iter().cloned()).collect()
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartStyle {
    pub title: String,
    pub title_font_size: u32,
    pub x_title: Option<String>,
    pub y_title: Option<String>,
    pub legend_title: Option<String>,
    pub palette: Vec<String>,
    pub value_range: Option<(f64, f64)>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub background: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableGrid {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Visual {
    /// `columns` orders the inline data for tabular output.
    Chart { spec: Value, columns: Vec<String> },
    Table { grid: TableGrid },
}

impl Visual {
    pub fn title(&self) -> Option<&str> {
        match self {
            Visual::Chart { spec, .. } => spec.pointer("/title/text").and_then(Value::as_str),
            Visual::Table { grid } => Some(grid.title.as_str()),
        }
    }
}

// ── Charts ──────────────────────────────────────────────────────

pub fn render_chart(table: &ShapedTable, kind: &ChartKind, style: &ChartStyle) -> Visual {
    let mut spec = Map::new();
    spec.insert("$schema".into(), json!(VEGA_LITE_SCHEMA));
    spec.insert("title".into(), title_block(style, table.is_empty()));
    spec.insert("data".into(), json!({ "values": table.records }));
    if let Some(width) = style.width {
        spec.insert("width".into(), json!(width));
    } else {
        spec.insert("width".into(), json!("container"));
    }
    if let Some(height) = style.height {
        spec.insert("height".into(), json!(height));
    }
    if let Some(background) = &style.background {
        spec.insert("background".into(), json!(background));
    }

    let (mark, encoding, transform) = match kind {
        ChartKind::Pie {
            category,
            value,
            hole,
        } => pie_layer(category, value, *hole, style),
        ChartKind::Line {
            x,
            y,
            series,
            marker_size,
        } => line_layer(x, y, series, *marker_size, style),
        ChartKind::Bar { x, y } => bar_layer(x, y, style),
        ChartKind::GroupedBar { x, measures } => grouped_bar_layer(x, measures, style),
        ChartKind::HorizontalOverlayBar { y, measures } => overlay_bar_layer(y, measures, style),
    };
    if let Some(transform) = transform {
        spec.insert("transform".into(), transform);
    }
    spec.insert("mark".into(), mark);
    spec.insert("encoding".into(), encoding);

    let mut columns = kind.columns();
    for column in table.columns() {
        if !columns.contains(&column) {
            columns.push(column);
        }
    }

    Visual::Chart {
        spec: Value::Object(spec),
        columns,
    }
}

fn title_block(style: &ChartStyle, empty: bool) -> Value {
    let mut title = json!({
        "text": style.title,
        "fontSize": style.title_font_size,
        "anchor": "middle",
    });
    if empty {
        title["subtitle"] = json!(EMPTY_SUBTITLE);
    }
    title
}

fn color_scale(style: &ChartStyle) -> Value {
    if style.palette.is_empty() {
        json!({})
    } else {
        json!({ "range": style.palette })
    }
}

fn value_scale(style: &ChartStyle) -> Value {
    match style.value_range {
        Some((low, high)) => json!({ "domain": [low, high] }),
        None => json!({}),
    }
}

fn legend(style: &ChartStyle) -> Value {
    match &style.legend_title {
        Some(title) => json!({ "title": title }),
        None => json!({}),
    }
}

type Layer = (Value, Value, Option<Value>);

fn pie_layer(category: &str, value: &str, hole: f64, style: &ChartStyle) -> Layer {
    let mark = json!({
        "type": "arc",
        "outerRadius": PIE_OUTER_RADIUS,
        "innerRadius": PIE_OUTER_RADIUS * hole.clamp(0.0, 0.95),
    });
    let encoding = json!({
        "theta": { "field": value, "type": "quantitative", "stack": true },
        "color": {
            "field": category,
            "type": "nominal",
            "sort": null,
            "scale": color_scale(style),
            "legend": legend(style),
        },
        "tooltip": [
            { "field": category, "type": "nominal" },
            { "field": value, "type": "quantitative", "format": ",.0f" },
        ],
    });
    (mark, encoding, None)
}

fn line_layer(x: &str, y: &str, series: &str, marker_size: u32, style: &ChartStyle) -> Layer {
    let mark = json!({
        "type": "line",
        "point": { "filled": true, "size": marker_size.saturating_mul(marker_size) },
    });
    let encoding = json!({
        "x": {
            "field": x,
            "type": "ordinal",
            "title": style.x_title,
            "axis": { "grid": true },
        },
        "y": {
            "field": y,
            "type": "quantitative",
            "title": style.y_title,
            "scale": value_scale(style),
            "axis": { "grid": true },
        },
        "color": {
            "field": series,
            "type": "nominal",
            "scale": color_scale(style),
            "legend": legend(style),
        },
    });
    (mark, encoding, None)
}

fn bar_layer(x: &str, y: &str, style: &ChartStyle) -> Layer {
    let encoding = json!({
        "x": { "field": x, "type": "nominal", "sort": null, "title": style.x_title },
        "y": {
            "field": y,
            "type": "quantitative",
            "title": style.y_title,
            "scale": value_scale(style),
        },
        "color": {
            "field": x,
            "type": "nominal",
            "sort": null,
            "scale": color_scale(style),
            "legend": legend(style),
        },
    });
    (json!({ "type": "bar" }), encoding, None)
}

fn fold(measures: &[String]) -> Value {
    json!([{ "fold": measures, "as": ["measure", "value"] }])
}

fn grouped_bar_layer(x: &str, measures: &[String], style: &ChartStyle) -> Layer {
    let encoding = json!({
        "x": { "field": x, "type": "nominal", "sort": null, "title": style.x_title },
        "xOffset": { "field": "measure", "type": "nominal" },
        "y": {
            "field": "value",
            "type": "quantitative",
            "title": style.y_title,
            "scale": value_scale(style),
        },
        "color": {
            "field": "measure",
            "type": "nominal",
            "scale": color_scale(style),
            "legend": legend(style),
        },
    });
    (json!({ "type": "bar" }), encoding, Some(fold(measures)))
}

fn overlay_bar_layer(y: &str, measures: &[String], style: &ChartStyle) -> Layer {
    let mark = json!({
        "type": "bar",
        "opacity": 0.85,
        "stroke": "black",
        "strokeWidth": 1,
        "height": { "band": 0.8 },
    });
    let encoding = json!({
        "y": { "field": y, "type": "nominal", "sort": null, "title": style.y_title },
        "x": {
            "field": "value",
            "type": "quantitative",
            "stack": null,
            "title": style.x_title,
            "scale": value_scale(style),
        },
        "color": {
            "field": "measure",
            "type": "nominal",
            "scale": { "domain": measures, "range": style.palette },
            "legend": legend(style),
        },
    });
    (mark, encoding, Some(fold(measures)))
}

// ── Tables ──────────────────────────────────────────────────────

/// Grid with the given column order; missing fields render empty.
pub fn render_table(table: &ShapedTable, title: &str, columns: &[&str]) -> Visual {
    let rows = table
        .records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| cell_text(record.get(*column)))
                .collect()
        })
        .collect();
    Visual::Table {
        grid: TableGrid {
            title: title.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        },
    }
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => match number.as_f64() {
            Some(f) if number.is_f64() => format!("{f:.2}"),
            _ => number.to_string(),
        },
        Some(other) => other.to_string(),
    }
}

/// Fixed-width text rendering of a grid, one header row then data rows.
pub fn grid_to_text(grid: &TableGrid) -> String {
    let mut widths: Vec<usize> = grid.columns.iter().map(|c| c.chars().count()).collect();
    for row in &grid.rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![grid.title.clone(), line(&grid.columns)];
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    if grid.rows.is_empty() {
        out.push("(no rows)".to_string());
    }
    for row in &grid.rows {
        out.push(line(row));
    }
    out.join("\n")
}

/// Text rendering of any visual: grids as-is, charts as their data table.
pub fn visual_to_text(visual: &Visual) -> String {
    match visual {
        Visual::Table { grid } => grid_to_text(grid),
        Visual::Chart { spec, columns } => {
            let records = spec
                .pointer("/data/values")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            let table = ShapedTable { records };
            let column_refs: Vec<&str> = columns.iter().map(String::as_str).collect();
            let title = visual.title().unwrap_or_default().to_string();
            match render_table(&table, &title, &column_refs) {
                Visual::Table { grid } => grid_to_text(&grid),
                Visual::Chart { .. } => String::new(),
            }
        }
    }
}

/// Standalone HTML page embedding one chart spec with vega-embed.
pub fn html_page(title: &str, spec: &Value) -> DashResult<String> {
    let spec_json = serde_json::to_string(spec)?;
    let title = html_escape(title);
    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>{title}</title>
  <script src="https://cdn.jsdelivr.net/npm/vega@5"></script>
  <script src="https://cdn.jsdelivr.net/npm/vega-lite@5"></script>
  <script src="https://cdn.jsdelivr.net/npm/vega-embed@6"></script>
  <style>body {{ background-color: #f0f2f6; font-family: sans-serif; }} #vis {{ width: 100%; }}</style>
</head>
<body>
  <h2 style="text-align:center;color:#007bff">{title}</h2>
  <div id="vis"></div>
  <script>vegaEmbed('#vis', {spec_json});</script>
</body>
</html>
"#
    ))
}

pub fn html_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
