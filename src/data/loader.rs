use std::collections::HashMap;

use super::error::{Field, LoadError, SchemaError};
use super::model::{Cell, MonthlyRecord, MonthlySeries, RawSheet};
use super::source::TabularReader;

/// Rows of title/metadata above the real header in the sizing spreadsheet.
pub const HEADER_SKIP_ROWS: usize = 23;

/// Columns that older versions of the spreadsheet carry and nothing uses.
pub const OBSOLETE_COLUMNS: [&str; 3] = ["Payback", "Unnamed: 27", "0"];

/// Only the first operating year is charted.
pub const REPORT_YEAR: i64 = 1;

/// Savings may differ from the cost columns by rounding; beyond this the
/// spreadsheet is probably inconsistent and worth a warning.
pub const SAVINGS_DRIFT_TOLERANCE: f64 = 1.0;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the year-1 monthly series from any tabular source.
///
/// Pipeline:
/// ```text
///  RawSheet ──skip 23 rows──▶ ReportTable ──drop obsolete──▶ resolve columns
///           ──Year == 1──▶ coerce fields ──▶ MonthlySeries
/// ```
///
/// An empty series is a successful load; it means the sheet has no year-1
/// rows.
pub fn load_report(source: &dyn TabularReader) -> Result<MonthlySeries, LoadError> {
    let name = source.source_name();
    let sheet = source.read_sheet()?;
    log::debug!("{name}: read {} raw rows", sheet.len());

    let series = normalize(&sheet).map_err(|e| LoadError::schema(&name, e))?;

    for rec in &series.records {
        let drift = rec.savings_drift();
        if drift.abs() > SAVINGS_DRIFT_TOLERANCE {
            log::warn!(
                "{name}: row {} ({}) states savings {:.2} but costs imply {:.2}",
                rec.source_row,
                rec.month,
                rec.savings,
                rec.savings - drift
            );
        }
    }

    log::info!("{name}: loaded {} year-{REPORT_YEAR} months", series.len());
    Ok(series)
}

/// Turn a raw sheet into validated records.
pub fn normalize(sheet: &RawSheet) -> Result<MonthlySeries, SchemaError> {
    let mut table = ReportTable::from_sheet(sheet, HEADER_SKIP_ROWS)?;
    table.drop_columns(&OBSOLETE_COLUMNS);
    let columns = ColumnMap::resolve(&table)?;

    let mut records = Vec::new();
    let mut seen_months: HashMap<String, usize> = HashMap::new();

    for row in &table.rows {
        if columns.cell(row, Field::Year).as_integer() != Some(REPORT_YEAR) {
            continue;
        }

        let month = month_label(columns.cell(row, Field::Month), row.sheet_row)?;
        if let Some(&first_row) = seen_months.get(&month) {
            return Err(SchemaError::DuplicateMonth {
                month,
                row: row.sheet_row,
                first_row,
            });
        }
        seen_months.insert(month.clone(), row.sheet_row);

        let number = |field| number_value(columns.cell(row, field), field, row.sheet_row);
        records.push(MonthlyRecord {
            month,
            consumed_kwh: number(Field::ConsumedKwh)?,
            generated_kwh: number(Field::GeneratedKwh)?,
            cost_without_system: number(Field::CostWithoutSystem)?,
            cost_with_system: number(Field::CostWithSystem)?,
            savings: number(Field::Savings)?,
            source_row: row.sheet_row,
        });
    }

    Ok(MonthlySeries::new(records))
}

// ---------------------------------------------------------------------------
// ReportTable – header + data rows after the preamble
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct TableRow {
    /// 1-based row number in the sheet.
    sheet_row: usize,
    cells: Vec<Cell>,
}

#[derive(Debug, Clone)]
struct ReportTable {
    columns: Vec<String>,
    rows: Vec<TableRow>,
}

impl ReportTable {
    /// Skip `skip` rows; the next row is the header, the rest is data.
    fn from_sheet(sheet: &RawSheet, skip: usize) -> Result<Self, SchemaError> {
        let mut remaining = sheet.rows.iter().enumerate().skip(skip);
        let (_, header) = remaining
            .next()
            .ok_or(SchemaError::MissingHeader { skipped: skip })?;

        let columns: Vec<String> = header.iter().enumerate().map(header_name).collect();

        let rows = remaining
            .map(|(idx, cells)| {
                let mut cells = cells.clone();
                cells.resize(columns.len(), Cell::Empty);
                TableRow {
                    sheet_row: idx + 1,
                    cells,
                }
            })
            .collect();

        Ok(ReportTable { columns, rows })
    }

    /// Remove the named columns. Names not present are ignored.
    fn drop_columns(&mut self, names: &[&str]) {
        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|c| !names.contains(&c.as_str()))
            .collect();
        if keep.iter().all(|k| *k) {
            return;
        }

        let dropped: Vec<&String> = self
            .columns
            .iter()
            .zip(&keep)
            .filter(|(_, k)| !**k)
            .map(|(c, _)| c)
            .collect();
        log::debug!("Dropping obsolete columns {dropped:?}");

        self.columns = retain_by_mask(std::mem::take(&mut self.columns), &keep);
        for row in &mut self.rows {
            row.cells = retain_by_mask(std::mem::take(&mut row.cells), &keep);
        }
    }

    fn position(&self, field: Field) -> Option<usize> {
        field
            .header_names()
            .iter()
            .find_map(|name| self.columns.iter().position(|c| c == name))
    }
}

fn retain_by_mask<T>(items: Vec<T>, keep: &[bool]) -> Vec<T> {
    items
        .into_iter()
        .zip(keep)
        .filter(|(_, k)| **k)
        .map(|(item, _)| item)
        .collect()
}

/// Header naming follows what a dataframe reader would produce: blank
/// headers become `Unnamed: <col>`, numeric headers their plain digits.
fn header_name((col, cell): (usize, &Cell)) -> String {
    if cell.is_empty() {
        format!("Unnamed: {col}")
    } else {
        cell.to_string().trim().to_string()
    }
}

// ---------------------------------------------------------------------------
// Column resolution and cell coercion
// ---------------------------------------------------------------------------

/// Index of every required field in the table, resolved once.
struct ColumnMap {
    index: HashMap<Field, usize>,
}

impl ColumnMap {
    fn resolve(table: &ReportTable) -> Result<Self, SchemaError> {
        let mut index = HashMap::new();
        for field in Field::ALL {
            let pos = table
                .position(field)
                .ok_or(SchemaError::MissingColumn { field })?;
            index.insert(field, pos);
        }
        Ok(ColumnMap { index })
    }

    fn cell<'a>(&self, row: &'a TableRow, field: Field) -> &'a Cell {
        &row.cells[self.index[&field]]
    }
}

fn month_label(cell: &Cell, row: usize) -> Result<String, SchemaError> {
    if cell.is_empty() {
        return Err(SchemaError::MissingValue {
            field: Field::Month,
            row,
        });
    }
    Ok(cell.to_string().trim().to_string())
}

/// Numeric coercion. Blank, text and error cells are rejected, never zeroed.
fn number_value(cell: &Cell, field: Field, row: usize) -> Result<f64, SchemaError> {
    let non_numeric = || SchemaError::NonNumeric {
        field,
        row,
        value: cell.to_string(),
    };

    let value = match cell {
        _ if cell.is_empty() => return Err(SchemaError::MissingValue { field, row }),
        Cell::Number(v) => *v,
        Cell::Text(s) => s.trim().parse::<f64>().map_err(|_| non_numeric())?,
        Cell::Bool(_) | Cell::Error(_) | Cell::Empty => return Err(non_numeric()),
    };

    if !value.is_finite() {
        return Err(non_numeric());
    }
    if field.non_negative() && value < 0.0 {
        return Err(SchemaError::Negative { field, row, value });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: [&str; 7] = [
        "Ano",
        "Mês",
        "Consumo faturado (kWh)",
        "Energia gerada (kWh)",
        "Vai pagar",
        "Você pagava",
        "Economia",
    ];

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn num(v: f64) -> Cell {
        Cell::Number(v)
    }

    fn preamble() -> Vec<Vec<Cell>> {
        let mut rows = vec![vec![text("Dimensionamento do sistema fotovoltaico")]];
        rows.extend((1..HEADER_SKIP_ROWS).map(|i| vec![text("Parâmetro"), num(i as f64)]));
        rows
    }

    fn data_row(year: f64, month: &str, values: [f64; 5]) -> Vec<Cell> {
        let [consumed, generated, will_pay, used_to_pay, savings] = values;
        vec![
            num(year),
            text(month),
            num(consumed),
            num(generated),
            num(will_pay),
            num(used_to_pay),
            num(savings),
        ]
    }

    fn sheet_with(header: &[&str], data: Vec<Vec<Cell>>) -> RawSheet {
        let mut rows = preamble();
        rows.push(header.iter().map(|h| text(h)).collect());
        rows.extend(data);
        RawSheet::new(rows)
    }

    fn three_months() -> RawSheet {
        sheet_with(
            &HEADER,
            vec![
                data_row(1.0, "Jan", [100.0, 120.0, 80.0, 150.0, 70.0]),
                data_row(1.0, "Feb", [90.0, 80.0, 95.0, 140.0, 45.0]),
                data_row(1.0, "Mar", [110.0, 130.0, 75.0, 155.0, 80.0]),
                data_row(2.0, "Jan", [100.0, 118.0, 82.0, 160.0, 78.0]),
            ],
        )
    }

    #[test]
    fn keeps_year_one_rows_in_sheet_order() {
        let series = normalize(&three_months()).unwrap();
        let months: Vec<&str> = series.records.iter().map(|r| r.month.as_str()).collect();
        assert_eq!(months, ["Jan", "Feb", "Mar"]);

        let jan = &series.records[0];
        assert_eq!(jan.consumed_kwh, 100.0);
        assert_eq!(jan.generated_kwh, 120.0);
        assert_eq!(jan.cost_with_system, 80.0);
        assert_eq!(jan.cost_without_system, 150.0);
        assert_eq!(jan.savings, 70.0);
        // 23 preamble rows + header, first data row is sheet row 25.
        assert_eq!(jan.source_row, 25);
    }

    #[test]
    fn english_headers_are_accepted() {
        let header = [
            "Year",
            "Month",
            "Consumption (kWh)",
            "Generated Energy (kWh)",
            "Will Pay",
            "Used To Pay",
            "Savings",
        ];
        let sheet = sheet_with(
            &header,
            vec![data_row(1.0, "Jan", [100.0, 120.0, 80.0, 150.0, 70.0])],
        );
        assert_eq!(normalize(&sheet).unwrap().len(), 1);
    }

    #[test]
    fn missing_consumption_column_is_a_schema_error() {
        let header = [
            "Ano",
            "Mês",
            "Energia gerada (kWh)",
            "Vai pagar",
            "Você pagava",
            "Economia",
        ];
        let sheet = sheet_with(
            &header,
            vec![vec![
                num(1.0),
                text("Jan"),
                num(120.0),
                num(80.0),
                num(150.0),
                num(70.0),
            ]],
        );
        assert_eq!(
            normalize(&sheet).unwrap_err(),
            SchemaError::MissingColumn {
                field: Field::ConsumedKwh
            }
        );
    }

    #[test]
    fn no_year_one_rows_is_an_empty_series() {
        let sheet = sheet_with(
            &HEADER,
            vec![data_row(2.0, "Jan", [100.0, 120.0, 80.0, 150.0, 70.0])],
        );
        let series = normalize(&sheet).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn year_stored_as_text_is_not_year_one() {
        let mut typed_as_text = data_row(1.0, "Feb", [90.0, 80.0, 95.0, 140.0, 45.0]);
        typed_as_text[0] = text("1");
        let sheet = sheet_with(
            &HEADER,
            vec![data_row(1.0, "Jan", [100.0, 120.0, 80.0, 150.0, 70.0]), typed_as_text],
        );
        let series = normalize(&sheet).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.records[0].month, "Jan");
    }

    #[test]
    fn sheet_shorter_than_preamble_has_no_header() {
        let sheet = RawSheet::new(preamble());
        assert_eq!(
            normalize(&sheet).unwrap_err(),
            SchemaError::MissingHeader {
                skipped: HEADER_SKIP_ROWS
            }
        );
    }

    #[test]
    fn text_in_numeric_field_fails_the_whole_load() {
        let mut bad = data_row(1.0, "Feb", [90.0, 80.0, 95.0, 140.0, 45.0]);
        bad[2] = text("n/a");
        let sheet = sheet_with(
            &HEADER,
            vec![data_row(1.0, "Jan", [100.0, 120.0, 80.0, 150.0, 70.0]), bad],
        );
        assert_eq!(
            normalize(&sheet).unwrap_err(),
            SchemaError::NonNumeric {
                field: Field::ConsumedKwh,
                row: 26,
                value: "n/a".into()
            }
        );
    }

    #[test]
    fn blank_numeric_cell_is_not_zero_filled() {
        let mut bad = data_row(1.0, "Jan", [100.0, 120.0, 80.0, 150.0, 70.0]);
        bad[6] = Cell::Empty;
        let sheet = sheet_with(&HEADER, vec![bad]);
        assert_eq!(
            normalize(&sheet).unwrap_err(),
            SchemaError::MissingValue {
                field: Field::Savings,
                row: 25
            }
        );
    }

    #[test]
    fn numeric_text_is_coerced() {
        let mut row = data_row(1.0, "Jan", [100.0, 120.0, 80.0, 150.0, 70.0]);
        row[2] = text(" 1234.9 ");
        let series = normalize(&sheet_with(&HEADER, vec![row])).unwrap();
        assert_eq!(series.records[0].consumed_kwh, 1234.9);
    }

    #[test]
    fn negative_cost_is_rejected_but_negative_savings_is_not() {
        let sheet = sheet_with(
            &HEADER,
            vec![data_row(1.0, "Jan", [100.0, 120.0, 160.0, 150.0, -10.0])],
        );
        assert_eq!(normalize(&sheet).unwrap().records[0].savings, -10.0);

        let sheet = sheet_with(
            &HEADER,
            vec![data_row(1.0, "Jan", [100.0, -1.0, 80.0, 150.0, 70.0])],
        );
        assert!(matches!(
            normalize(&sheet).unwrap_err(),
            SchemaError::Negative {
                field: Field::GeneratedKwh,
                ..
            }
        ));
    }

    #[test]
    fn repeated_month_in_year_one_is_rejected() {
        let sheet = sheet_with(
            &HEADER,
            vec![
                data_row(1.0, "Jan", [100.0, 120.0, 80.0, 150.0, 70.0]),
                data_row(1.0, "Jan", [90.0, 80.0, 95.0, 140.0, 45.0]),
            ],
        );
        assert_eq!(
            normalize(&sheet).unwrap_err(),
            SchemaError::DuplicateMonth {
                month: "Jan".into(),
                row: 26,
                first_row: 25
            }
        );
    }

    #[test]
    fn bad_values_outside_year_one_are_ignored() {
        let mut other_year = data_row(2.0, "Jan", [0.0; 5]);
        other_year[2] = text("n/a");
        let totals = vec![text("Total"), Cell::Empty, num(300.0)];
        let sheet = sheet_with(
            &HEADER,
            vec![
                data_row(1.0, "Jan", [100.0, 120.0, 80.0, 150.0, 70.0]),
                other_year,
                totals,
                Vec::new(),
            ],
        );
        assert_eq!(normalize(&sheet).unwrap().len(), 1);
    }

    #[test]
    fn obsolete_columns_are_dropped_when_present() {
        let mut header: Vec<&str> = HEADER.to_vec();
        header.insert(0, "0");
        header.push("Payback");
        let row = |year: f64, month: &str, values| {
            let mut r = data_row(year, month, values);
            r.insert(0, num(7.0));
            r.push(text("3 anos"));
            r
        };
        let sheet = sheet_with(
            &header,
            vec![row(1.0, "Jan", [100.0, 120.0, 80.0, 150.0, 70.0])],
        );

        let mut table = ReportTable::from_sheet(&sheet, HEADER_SKIP_ROWS).unwrap();
        table.drop_columns(&OBSOLETE_COLUMNS);
        assert_eq!(table.columns, HEADER.to_vec());
        assert_eq!(table.rows[0].cells.len(), HEADER.len());

        assert_eq!(normalize(&sheet).unwrap().len(), 1);
    }

    #[test]
    fn blank_header_cells_get_positional_names() {
        let mut header: Vec<Cell> = HEADER.iter().map(|h| text(h)).collect();
        header.push(Cell::Empty);
        let mut rows = preamble();
        rows.push(header);
        let table = ReportTable::from_sheet(&RawSheet::new(rows), HEADER_SKIP_ROWS).unwrap();
        assert_eq!(table.columns.last().map(String::as_str), Some("Unnamed: 7"));
    }

    #[test]
    fn column_order_does_not_change_the_result() {
        let reordered_header = [
            "Economia",
            "Vai pagar",
            "Mês",
            "Notas",
            "Você pagava",
            "Ano",
            "Energia gerada (kWh)",
            "Consumo faturado (kWh)",
        ];
        let reorder = |r: Vec<Cell>| {
            vec![
                r[6].clone(),
                r[4].clone(),
                r[1].clone(),
                text("obs"),
                r[5].clone(),
                r[0].clone(),
                r[3].clone(),
                r[2].clone(),
            ]
        };
        let original = three_months();
        let data: Vec<Vec<Cell>> = original.rows[HEADER_SKIP_ROWS + 1..]
            .iter()
            .cloned()
            .map(reorder)
            .collect();
        let shuffled = sheet_with(&reordered_header, data);

        assert_eq!(normalize(&shuffled).unwrap(), normalize(&original).unwrap());
    }

    #[test]
    fn load_report_wraps_schema_errors_with_source_name() {
        let sheet = sheet_with(&["Ano", "Mês"], Vec::new());
        let err = load_report(&sheet).unwrap_err();
        assert!(matches!(
            err.schema_error(),
            Some(SchemaError::MissingColumn { .. })
        ));
        assert!(err.to_string().starts_with("in-memory sheet:"));
    }

    #[test]
    fn stated_savings_are_kept_even_when_inconsistent() {
        // Costs imply 70, the sheet says 75: the sheet wins.
        let sheet = sheet_with(
            &HEADER,
            vec![data_row(1.0, "Jan", [100.0, 120.0, 80.0, 150.0, 75.0])],
        );
        let series = load_report(&sheet).unwrap();
        assert_eq!(series.records[0].savings, 75.0);
        assert_eq!(series.records[0].savings_drift(), 5.0);
    }
}
