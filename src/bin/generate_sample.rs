use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

const MONTHS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

/// Rows above the table header, as in the installer's template.
const PREAMBLE_ROWS: u32 = 23;
const YEARS: u32 = 25;

const SYSTEM_KWP: f64 = 6.6;
const TARIFF: f64 = 0.92;
const TARIFF_INCREASE: f64 = 0.05;
const PANEL_DEGRADATION: f64 = 0.005;
/// Minimum bill (availability charge) in kWh.
const MIN_BILLED_KWH: f64 = 50.0;

/// Peak sun hours per day for each month (southern hemisphere).
const SUN_HOURS: [f64; 12] = [5.8, 5.9, 5.4, 4.9, 4.3, 4.1, 4.3, 5.0, 5.1, 5.5, 5.7, 5.9];

/// Billed consumption per month in year 1 (kWh); summer air conditioning.
const CONSUMPTION: [f64; 12] = [
    742.4, 715.9, 688.2, 601.7, 540.3, 512.8, 498.6, 530.1, 575.4, 622.9, 684.5, 731.2,
];

fn write_preamble(sheet: &mut Worksheet, bold: &Format) -> Result<()> {
    let params: [(&str, f64); 8] = [
        ("Potência do sistema (kWp)", SYSTEM_KWP),
        ("Tarifa (R$/kWh)", TARIFF),
        ("Reajuste anual da tarifa", TARIFF_INCREASE),
        ("Degradação anual dos módulos", PANEL_DEGRADATION),
        ("Consumo mínimo faturado (kWh)", MIN_BILLED_KWH),
        ("Eficiência do inversor", 0.97),
        ("Perdas do sistema", 0.14),
        ("Horizonte de análise (anos)", YEARS as f64),
    ];

    sheet.write_string_with_format(0, 0, "Dimensionamento do sistema fotovoltaico", bold)?;
    for (i, (label, value)) in params.iter().enumerate() {
        let row = 2 + i as u32;
        sheet.write_string(row, 0, *label)?;
        sheet.write_number(row, 1, *value)?;
    }
    sheet.write_string(PREAMBLE_ROWS - 2, 0, "Projeção mensal")?;
    Ok(())
}

fn monthly_generation(month: usize, year: u32) -> f64 {
    let days = 30.4;
    let performance = 0.8;
    let degradation = (1.0 - PANEL_DEGRADATION).powi(year as i32 - 1);
    SYSTEM_KWP * SUN_HOURS[month] * days * performance * degradation
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn main() -> Result<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let money = Format::new().set_num_format("\"R$\" #,##0.00");

    let sheet = workbook.add_worksheet();
    sheet.set_name("Dimensionamento")?;
    write_preamble(sheet, &bold)?;

    // Leading index column ("0") and trailing "Payback" are kept for
    // compatibility with older templates; viewers drop them.
    let header = [
        "0",
        "Ano",
        "Mês",
        "Consumo faturado (kWh)",
        "Energia gerada (kWh)",
        "Vai pagar",
        "Você pagava",
        "Economia",
        "Payback",
    ];
    for (col, name) in header.iter().enumerate() {
        sheet.write_string_with_format(PREAMBLE_ROWS, col as u16, *name, &bold)?;
    }

    let mut row = PREAMBLE_ROWS + 1;
    let mut cumulative_savings = 0.0;
    let investment = SYSTEM_KWP * 3_900.0;

    for year in 1..=YEARS {
        let tariff = TARIFF * (1.0 + TARIFF_INCREASE).powi(year as i32 - 1);
        for (month, name) in MONTHS.iter().enumerate() {
            let consumed = CONSUMPTION[month];
            let generated = monthly_generation(month, year);
            let billed = (consumed - generated).max(MIN_BILLED_KWH);

            let used_to_pay = round2(consumed * tariff);
            let will_pay = round2(billed * tariff);
            let savings = round2(used_to_pay - will_pay);
            cumulative_savings += savings;

            sheet.write_number(row, 0, (row - PREAMBLE_ROWS - 1) as f64)?;
            sheet.write_number(row, 1, year as f64)?;
            sheet.write_string(row, 2, *name)?;
            sheet.write_number(row, 3, round2(consumed))?;
            sheet.write_number(row, 4, round2(generated))?;
            sheet.write_number_with_format(row, 5, will_pay, &money)?;
            sheet.write_number_with_format(row, 6, used_to_pay, &money)?;
            sheet.write_number_with_format(row, 7, savings, &money)?;
            sheet.write_number_with_format(row, 8, cumulative_savings - investment, &money)?;
            row += 1;
        }
    }

    let output_path = "dimensionamento.xlsx";
    workbook
        .save(output_path)
        .with_context(|| format!("writing {output_path}"))?;

    println!(
        "Wrote {YEARS} years × {} months ({} rows) to {output_path}",
        MONTHS.len(),
        row - PREAMBLE_ROWS - 1
    );
    Ok(())
}
