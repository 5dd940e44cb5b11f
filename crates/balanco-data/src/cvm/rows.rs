//! Parsing and filtering of CVM statement CSV files.
//!
//! The portal publishes one CSV per statement and year covering every listed
//! company. Files are ISO-8859-1 encoded and `;` separated.

use crate::error::{DataError, Result};
use crate::model::{FilingKind, LineItem, RowSet, StatementKind, normalize_company_code};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use tracing::debug;

/// Raw CSV record; only the columns the engine uses are read.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "CD_CVM")]
    company: String,
    #[serde(rename = "VERSAO", default)]
    version: Option<String>,
    #[serde(rename = "DT_INI_EXERC", default)]
    period_start: Option<String>,
    #[serde(rename = "DT_FIM_EXERC")]
    period_end: String,
    #[serde(rename = "CD_CONTA")]
    account_code: String,
    #[serde(rename = "DS_CONTA")]
    description: String,
    #[serde(rename = "VL_CONTA")]
    value: String,
}

/// A row that survived the company and year filters.
#[derive(Debug)]
struct DatedRow {
    period_end: NaiveDate,
    period_start: Option<NaiveDate>,
    version: u32,
    item: LineItem,
}

/// Decode ISO-8859-1 bytes; every byte maps to the code point of equal value.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Parse a filed amount, treating malformed values as zero.
///
/// # Example
/// ```
/// # use balanco_data::cvm::rows::parse_amount;
/// assert_eq!(parse_amount("1234.5000000000"), 1234.5);
/// assert_eq!(parse_amount("-12,5"), -12.5);
/// assert_eq!(parse_amount("n/a"), 0.0);
/// ```
pub fn parse_amount(raw: &str) -> f64 {
    let trimmed = raw.trim();
    let parsed = if trimmed.contains(',') && !trimmed.contains('.') {
        trimmed.replace(',', ".").parse::<f64>()
    } else {
        trimmed.parse::<f64>()
    };

    match parsed {
        Ok(value) if value.is_finite() => value,
        _ => {
            debug!(value = raw, "malformed amount treated as zero");
            0.0
        }
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Extract one company's statement for one fiscal year from a CVM CSV file.
///
/// Rows are kept when the company code matches (leading zeros ignored) and the
/// period end falls in `year`. Only the latest filing version is kept. For
/// quarterly filings only the latest period end of the year survives, and for
/// income statements the year-to-date window. Zero and malformed amounts are
/// dropped.
///
/// # Errors
/// Returns [`DataError::EmptyResult`] when nothing is left after filtering and
/// [`DataError::Csv`] when the file cannot be read as CSV.
pub fn parse_statement_csv(
    text: &str,
    company: &str,
    year: i32,
    statement: StatementKind,
    filing: FilingKind,
) -> Result<RowSet> {
    let company = normalize_company_code(company);
    if company.is_empty() {
        return Err(DataError::InvalidCompany("Empty company code".to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.deserialize::<RawRow>() {
        let raw = record?;
        if normalize_company_code(&raw.company) != company {
            continue;
        }
        let Some(period_end) = parse_date(&raw.period_end) else {
            debug!(date = %raw.period_end, "skipping row with unreadable period end");
            continue;
        };
        if period_end.year() != year {
            continue;
        }

        rows.push(DatedRow {
            period_end,
            period_start: raw.period_start.as_deref().and_then(parse_date),
            version: raw
                .version
                .as_deref()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0),
            item: LineItem::new(raw.account_code, raw.description, parse_amount(&raw.value)),
        });
    }

    let rows = select_latest(rows, statement, filing);
    let row_set = RowSet::new(rows.into_iter().map(|row| row.item).collect());

    debug!(
        company = %company,
        year,
        statement = %statement,
        items = row_set.len(),
        "filtered statement rows"
    );

    if row_set.is_empty() {
        return Err(DataError::EmptyResult {
            company,
            year,
            statement: statement.cvm_code().to_string(),
        });
    }

    Ok(row_set)
}

/// Keep the latest version and, for quarterly filings, the latest period.
fn select_latest(rows: Vec<DatedRow>, statement: StatementKind, filing: FilingKind) -> Vec<DatedRow> {
    let Some(version) = rows.iter().map(|row| row.version).max() else {
        return rows;
    };
    let mut rows: Vec<DatedRow> = rows.into_iter().filter(|row| row.version == version).collect();

    if filing == FilingKind::Quarterly {
        if let Some(latest_end) = rows.iter().map(|row| row.period_end).max() {
            rows.retain(|row| row.period_end == latest_end);
        }
        if statement.is_flow()
            && let Some(earliest_start) = rows.iter().filter_map(|row| row.period_start).min()
        {
            rows.retain(|row| row.period_start.is_none_or(|start| start == earliest_start));
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    const BPP_HEADER: &str = "CNPJ_CIA;DT_REFER;VERSAO;DENOM_CIA;CD_CVM;GRUPO_DFP;MOEDA;ESCALA_MOEDA;ORDEM_EXERC;DT_FIM_EXERC;CD_CONTA;DS_CONTA;VL_CONTA;ST_CONTA_FIXA";

    fn bpp_line(company: &str, version: u32, end: &str, code: &str, desc: &str, value: &str) -> String {
        format!(
            "00.000.000/0001-00;{end};{version};CIA TESTE;{company};DF Consolidado - Balanço Patrimonial Passivo;REAL;MIL;ÚLTIMO;{end};{code};{desc};{value};S"
        )
    }

    #[test]
    fn test_decode_latin1() {
        let bytes = [0x50, 0x61, 0x74, 0x72, 0x69, 0x6D, 0xF4, 0x6E, 0x69, 0x6F];
        assert_eq!(decode_latin1(&bytes), "Patrimônio");
    }

    #[test]
    fn test_filters_company_and_year() {
        let text = [
            BPP_HEADER.to_string(),
            bpp_line("022470", 1, "2021-12-31", "2.01", "Passivo Circulante", "500.0000000000"),
            bpp_line("022470", 1, "2020-12-31", "2.01", "Passivo Circulante", "400.0000000000"),
            bpp_line("009512", 1, "2021-12-31", "2.01", "Passivo Circulante", "900.0000000000"),
        ]
        .join("\n");

        let rows = parse_statement_csv(
            &text,
            "22470",
            2021,
            StatementKind::LiabilitiesBalance,
            FilingKind::Annual,
        )
        .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows.items()[0].value, 500.0);
    }

    #[test]
    fn test_keeps_latest_version() {
        let text = [
            BPP_HEADER.to_string(),
            bpp_line("22470", 1, "2021-12-31", "2.01.02", "Fornecedores", "100.0"),
            bpp_line("22470", 2, "2021-12-31", "2.01.02", "Fornecedores", "120.0"),
        ]
        .join("\n");

        let rows = parse_statement_csv(
            &text,
            "22470",
            2021,
            StatementKind::LiabilitiesBalance,
            FilingKind::Annual,
        )
        .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows.items()[0].value, 120.0);
    }

    #[test]
    fn test_drops_zero_and_malformed_values() {
        let text = [
            BPP_HEADER.to_string(),
            bpp_line("22470", 1, "2021-12-31", "2.01", "Passivo Circulante", "0.0000000000"),
            bpp_line("22470", 1, "2021-12-31", "2.02", "Passivo Não Circulante", "abc"),
            bpp_line("22470", 1, "2021-12-31", "2.03", "Patrimônio Líquido Consolidado", "800"),
        ]
        .join("\n");

        let rows = parse_statement_csv(
            &text,
            "22470",
            2021,
            StatementKind::LiabilitiesBalance,
            FilingKind::Annual,
        )
        .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows.items()[0].account_code, "2.03");
    }

    #[test]
    fn test_empty_result() {
        let text = [
            BPP_HEADER.to_string(),
            bpp_line("22470", 1, "2021-12-31", "2.01", "Passivo Circulante", "10"),
        ]
        .join("\n");

        let result = parse_statement_csv(
            &text,
            "22470",
            2019,
            StatementKind::LiabilitiesBalance,
            FilingKind::Annual,
        );
        assert!(matches!(result, Err(DataError::EmptyResult { year: 2019, .. })));
    }

    #[test]
    fn test_quarterly_keeps_latest_period_and_year_to_date() {
        let header = "CNPJ_CIA;DT_REFER;VERSAO;DENOM_CIA;CD_CVM;GRUPO_DFP;MOEDA;ESCALA_MOEDA;ORDEM_EXERC;DT_INI_EXERC;DT_FIM_EXERC;CD_CONTA;DS_CONTA;VL_CONTA";
        let line = |start: &str, end: &str, value: &str| {
            format!("x;{end};1;CIA;20036;DRE;REAL;MIL;ÚLTIMO;{start};{end};3.01;Receita de Venda de Bens e/ou Serviços;{value}")
        };
        let text = [
            header.to_string(),
            line("2023-04-01", "2023-06-30", "100"),
            line("2023-01-01", "2023-06-30", "180"),
            line("2023-01-01", "2023-03-31", "80"),
        ]
        .join("\n");

        let rows = parse_statement_csv(
            &text,
            "20036",
            2023,
            StatementKind::IncomeStatement,
            FilingKind::Quarterly,
        )
        .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows.items()[0].value, 180.0);
    }
}
