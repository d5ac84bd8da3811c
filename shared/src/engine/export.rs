//! Formula sheet and export builder
//!
//! Turns a finished [`ComputeResult`] into tabular rows, their CSV form and a
//! printable sheet. All quantities are converted from grams into the result's
//! display unit here and nowhere else.

use csv::{QuoteStyle, WriterBuilder};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::calculator::ComputeResult;
use super::lye_water::{FALLBACK_KOH_PER_GRAM, FALLBACK_NAOH_PER_GRAM};
use crate::error::CalcError;
use crate::types::{DisplayUnit, LyeChoice, QualityAxis};

pub const DEFAULT_SHEET_TITLE: &str = "Soap formula";

/// Appended to the lye row name when the total includes a citric acid offset
pub const CITRIC_MARKER: &str = "*";

/// One row of the export matrix; field order is the CSV column order
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ExportRow {
    pub section: String,
    pub name: String,
    pub quantity: String,
    pub unit: String,
    pub percent: String,
}

impl ExportRow {
    fn new(
        section: &str,
        name: impl Into<String>,
        quantity: String,
        unit: &str,
        percent: String,
    ) -> Self {
        Self {
            section: section.to_string(),
            name: name.into(),
            quantity,
            unit: unit.to_string(),
            percent,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SheetEntry {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SheetSection {
    pub title: String,
    pub entries: Vec<SheetEntry>,
}

impl SheetSection {
    fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            entries: Vec::new(),
        }
    }

    fn entry(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.entries.push(SheetEntry {
            label: label.into(),
            value: value.into(),
        });
    }
}

/// Templating context for the printable sheet
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SheetDocument {
    pub title: String,
    /// Set by the host; the engine never reads a clock
    pub prepared_on: Option<String>,
    pub unit: DisplayUnit,
    pub sections: Vec<SheetSection>,
    pub footnotes: Vec<String>,
}

impl Default for SheetDocument {
    fn default() -> Self {
        Self {
            title: DEFAULT_SHEET_TITLE.to_string(),
            prepared_on: None,
            unit: DisplayUnit::default(),
            sections: Vec::new(),
            footnotes: Vec::new(),
        }
    }
}

impl SheetDocument {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_prepared_on(mut self, date: impl Into<String>) -> Self {
        self.prepared_on = Some(date.into());
        self
    }

    pub fn section(&self, title: &str) -> Option<&SheetSection> {
        self.sections.iter().find(|section| section.title == title)
    }
}

/// Everything the export builder produces for one result
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
pub struct ExportPayload {
    pub rows: Vec<ExportRow>,
    pub csv: String,
    pub sheet: SheetDocument,
}

/// Round half away from zero and pad to exactly `dp` places
pub fn fixed(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", dp as usize, rounded)
}

fn quantity(grams: Decimal, unit: DisplayUnit) -> String {
    fixed(unit.from_grams(grams), unit.display_precision())
}

fn percent(value: Decimal) -> String {
    fixed(value, 2)
}

fn lye_row_marker(result: &ComputeResult) -> &'static str {
    if result.citric_lye_g > Decimal::ZERO {
        CITRIC_MARKER
    } else {
        ""
    }
}

/// Ordered export rows: summary, oils, lye, water, fragrance, additives
pub fn rows(result: &ComputeResult) -> Vec<ExportRow> {
    let unit = result.unit;
    let code = unit.code();
    let mut rows = Vec::new();

    let total_pct = if result.total_oils_g > Decimal::ZERO {
        percent(Decimal::ONE_HUNDRED)
    } else {
        String::new()
    };
    rows.push(ExportRow::new(
        "Summary",
        "Total oils",
        quantity(result.total_oils_g, unit),
        code,
        total_pct,
    ));
    rows.push(ExportRow::new(
        "Summary",
        "Superfat",
        percent(result.superfat_percent),
        "%",
        String::new(),
    ));
    rows.push(ExportRow::new(
        "Summary",
        "Lye purity",
        percent(result.purity_percent),
        "%",
        String::new(),
    ));
    rows.push(ExportRow::new(
        "Summary",
        "Lye concentration",
        percent(result.lye_concentration_pct),
        "%",
        String::new(),
    ));
    rows.push(ExportRow::new(
        "Summary",
        "Water : lye ratio",
        fixed(result.water_lye_ratio, 2),
        "ratio",
        String::new(),
    ));
    rows.push(ExportRow::new(
        "Summary",
        "Iodine",
        fixed(result.report.iodine, 2),
        "",
        String::new(),
    ));
    rows.push(ExportRow::new(
        "Summary",
        "INS",
        fixed(result.report.ins, 2),
        "",
        String::new(),
    ));

    for oil in &result.oils {
        rows.push(ExportRow::new(
            "Oils",
            oil.name.clone(),
            quantity(oil.mass_g, unit),
            code,
            percent(oil.percent_of_oils),
        ));
    }

    rows.push(ExportRow::new(
        "Lye",
        format!("{}{}", result.lye_choice, lye_row_marker(result)),
        quantity(result.lye_adjusted_g, unit),
        code,
        String::new(),
    ));

    rows.push(ExportRow::new(
        "Water",
        "Water",
        quantity(result.water_g, unit),
        code,
        percent(crate::types::percent_of(result.water_g, result.total_oils_g)),
    ));

    for fragrance in &result.additives.fragrances {
        rows.push(ExportRow::new(
            "Fragrance",
            fragrance.name.clone(),
            quantity(fragrance.mass_g, unit),
            code,
            percent(fragrance.percent_of_oils),
        ));
    }

    for additive in result.additives.amounts().into_iter().filter(|a| a.is_present()) {
        rows.push(ExportRow::new(
            "Additives",
            additive.name.clone(),
            quantity(additive.mass_g, unit),
            code,
            percent(additive.percent_of_oils),
        ));
    }

    rows
}

/// Serialize rows with a header and minimal quoting
pub fn to_csv(rows: &[ExportRow]) -> Result<String, CalcError> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .from_writer(vec![]);
    if rows.is_empty() {
        wtr.write_record(["section", "name", "quantity", "unit", "percent"])?;
    }
    for row in rows {
        wtr.serialize(row)?;
    }
    let bytes = wtr.into_inner()?;
    Ok(String::from_utf8(bytes)?)
}

fn footnotes(result: &ComputeResult) -> Vec<String> {
    let mut notes = Vec::new();

    if result.used_sap_fallback {
        notes.push(format!(
            "No oil supplied a usable SAP value; lye was estimated at {} g NaOH or {} g KOH per gram of oil.",
            FALLBACK_NAOH_PER_GRAM, FALLBACK_KOH_PER_GRAM
        ));
    }
    if result.lye_choice == LyeChoice::PotassiumHydroxide90 {
        notes.push("90% KOH selected; lye purity is fixed at 90%.".to_string());
    }

    let decimal_sap: Vec<&str> = result
        .oils
        .iter()
        .filter(|oil| oil.sap_was_decimal)
        .map(|oil| oil.name.as_str())
        .collect();
    if !decimal_sap.is_empty() {
        notes.push(format!(
            "SAP values entered in decimal form were multiplied by 1000: {}.",
            decimal_sap.join(", ")
        ));
    }

    if result.citric_lye_g > Decimal::ZERO {
        notes.push(format!(
            "{} Lye total includes {} {} of extra {} to neutralize citric acid ({} g per gram of citric acid).",
            CITRIC_MARKER,
            quantity(result.citric_lye_g, result.unit),
            result.unit.code(),
            result.lye_type,
            result.additives.citric_lye_factor
        ));
    }

    notes
}

/// Build the printable sheet context
pub fn sheet(result: &ComputeResult) -> SheetDocument {
    let unit = result.unit;
    let code = unit.code();
    let amount = |grams: Decimal| format!("{} {}", quantity(grams, unit), code);
    let mut sections = Vec::new();

    let mut summary = SheetSection::new("Summary");
    summary.entry("Total oils", amount(result.total_oils_g));
    summary.entry("Lye", result.lye_choice.to_string());
    summary.entry("Superfat", format!("{}%", percent(result.superfat_percent)));
    summary.entry("Lye purity", format!("{}%", percent(result.purity_percent)));
    summary.entry("Water method", result.water_method.to_string());
    sections.push(summary);

    let mut oils = SheetSection::new("Oils");
    for oil in &result.oils {
        oils.entry(
            oil.name.clone(),
            format!("{} ({}%)", amount(oil.mass_g), percent(oil.percent_of_oils)),
        );
    }
    sections.push(oils);

    let mut lye_water = SheetSection::new("Lye and water");
    lye_water.entry("Lye (base)", amount(result.lye_base_g));
    if result.citric_lye_g > Decimal::ZERO {
        lye_water.entry("Citric acid offset", amount(result.citric_lye_g));
    }
    lye_water.entry(format!("Lye total{}", lye_row_marker(result)), amount(result.lye_adjusted_g));
    lye_water.entry("Water", amount(result.water_g));
    lye_water.entry(
        "Lye concentration",
        format!("{}%", percent(result.lye_concentration_pct)),
    );
    lye_water.entry("Water : lye", format!("{} : 1", fixed(result.water_lye_ratio, 2)));
    sections.push(lye_water);

    let additive_lines: Vec<(String, String)> = result
        .additives
        .fragrances
        .iter()
        .map(|row| (row.name.clone(), row.mass_g, row.percent_of_oils))
        .chain(
            result
                .additives
                .amounts()
                .into_iter()
                .filter(|a| a.is_present())
                .map(|a| (a.name.clone(), a.mass_g, a.percent_of_oils)),
        )
        .map(|(name, grams, pct)| (name, format!("{} ({}%)", amount(grams), percent(pct))))
        .collect();
    if !additive_lines.is_empty() {
        let mut section = SheetSection::new("Fragrance and additives");
        for (label, value) in additive_lines {
            section.entry(label, value);
        }
        sections.push(section);
    }

    let report = &result.report;
    let mut qualities = SheetSection::new("Qualities");
    qualities.entry("Iodine", fixed(report.iodine, 1));
    qualities.entry("INS", fixed(report.ins, 1));
    for axis in QualityAxis::ALL {
        qualities.entry(axis.to_string(), fixed(report.qualities.get(axis), 1));
    }
    qualities.entry(
        "Saturated : unsaturated",
        format!(
            "{} : {}",
            fixed(report.saturated_pct, 0),
            fixed(report.unsaturated_pct, 0)
        ),
    );
    sections.push(qualities);

    if !report.warnings.is_empty() {
        let mut warnings = SheetSection::new("Warnings");
        for (i, warning) in report.warnings.iter().enumerate() {
            warnings.entry(format!("{}", i + 1), warning.clone());
        }
        sections.push(warnings);
    }

    let mut guidance = SheetSection::new("Guidance");
    for (i, line) in report.guidance.iter().enumerate() {
        guidance.entry(format!("{}", i + 1), line.clone());
    }
    sections.push(guidance);

    SheetDocument {
        unit,
        sections,
        footnotes: footnotes(result),
        ..SheetDocument::default()
    }
}

/// Rows, CSV and sheet for a finished result
pub fn build(result: &ComputeResult) -> Result<ExportPayload, CalcError> {
    let rows = rows(result);
    let csv = to_csv(&rows)?;
    Ok(ExportPayload {
        rows,
        csv,
        sheet: sheet(result),
    })
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Standalone printable HTML for a sheet
pub fn render_html(sheet: &SheetDocument) -> String {
    let mut html = String::with_capacity(4096);

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape(&sheet.title)));
    html.push_str("<style>\n");
    html.push_str("body { font-family: system-ui, sans-serif; max-width: 800px; ");
    html.push_str("margin: 40px auto; padding: 20px; line-height: 1.5; }\n");
    html.push_str("h1 { color: #2c3e50; margin-bottom: 4px; }\n");
    html.push_str("h2 { color: #34495e; border-bottom: 2px solid #ecf0f1; ");
    html.push_str("padding-bottom: 4px; margin-top: 28px; }\n");
    html.push_str("table { width: 100%; border-collapse: collapse; }\n");
    html.push_str("td { padding: 6px 10px; border-bottom: 1px solid #ecf0f1; }\n");
    html.push_str("td.value { text-align: right; }\n");
    html.push_str(".meta, .footnotes { color: #6c757d; font-size: 0.9em; }\n");
    html.push_str("@media print { body { margin: 0; } }\n");
    html.push_str("</style>\n</head>\n<body>\n");

    html.push_str(&format!("<h1>{}</h1>\n", escape(&sheet.title)));
    if let Some(date) = &sheet.prepared_on {
        html.push_str(&format!("<p class=\"meta\">Prepared {}</p>\n", escape(date)));
    }
    html.push_str(&format!(
        "<p class=\"meta\">Quantities in {}</p>\n",
        sheet.unit.code()
    ));

    for section in &sheet.sections {
        html.push_str(&format!("<h2>{}</h2>\n<table>\n", escape(&section.title)));
        for entry in &section.entries {
            html.push_str(&format!(
                "<tr><td>{}</td><td class=\"value\">{}</td></tr>\n",
                escape(&entry.label),
                escape(&entry.value)
            ));
        }
        html.push_str("</table>\n");
    }

    if !sheet.footnotes.is_empty() {
        html.push_str("<div class=\"footnotes\">\n");
        for note in &sheet.footnotes {
            html.push_str(&format!("<p>{}</p>\n", escape(note)));
        }
        html.push_str("</div>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}
