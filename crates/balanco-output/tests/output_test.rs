//! Integration tests for exporting and summarizing a computed analysis.

use balanco_data::{LineItem, RowSet};
use balanco_output::{ExportFormat, Exporter, Plotter, ReportBuilder, TerminalChart, summarize_analysis};
use balanco_ratios::{
    AccountMatcher, AdjustedDupont, Analysis, Calculator, FiscalStatements, Model, PeriodState,
    RatioCalculator, Series, TraditionalDupont,
};

fn statements(fiscal_year: i32, current_liabilities: f64) -> FiscalStatements {
    FiscalStatements::new(
        fiscal_year,
        RowSet::new(vec![
            LineItem::new("1", "Ativo Total", 5000.0),
            LineItem::new("1.01", "Ativo Circulante", 1000.0),
            LineItem::new("1.01.01", "Caixa e Equivalentes de Caixa", 100.0),
            LineItem::new("1.01.04", "Estoques", 200.0),
        ]),
        RowSet::new(vec![
            LineItem::new("2.01", "Passivo Circulante", current_liabilities),
            LineItem::new("2.03", "Patrimônio Líquido Consolidado", 2500.0),
        ]),
        RowSet::new(vec![
            LineItem::new("3.01", "Receita de Venda de Bens e/ou Serviços", 4000.0),
            LineItem::new("3.02", "Custo dos Bens e/ou Serviços Vendidos", -2500.0),
            LineItem::new("3.11", "Lucro/Prejuízo Consolidado do Período", 250.0),
        ]),
    )
}

fn analysis() -> Analysis {
    let matcher = AccountMatcher::cvm().unwrap();
    let calculators: [Box<dyn Calculator>; 3] = [
        Box::new(RatioCalculator::new()),
        Box::new(TraditionalDupont::new()),
        Box::new(AdjustedDupont::new()),
    ];

    let mut series: Vec<Series> = Vec::new();
    for calculator in &calculators {
        let mut builder = Series::builder(calculator.model());
        let mut state = PeriodState::Absent;
        for (year, liabilities) in [(2020, 500.0), (2021, 0.0)] {
            let (set, next) =
                calculator.compute_statements(&matcher, &statements(year, liabilities), &state);
            builder.push(year, set).unwrap();
            state = next;
        }
        builder.skip(2022, "archive unavailable").unwrap();
        series.push(builder.finish());
    }

    let adjusted = series.pop().unwrap();
    let traditional = series.pop().unwrap();
    let ratios = series.pop().unwrap();
    Analysis {
        company: "9512".to_string(),
        from: 2020,
        to: 2022,
        ratios,
        traditional,
        adjusted,
    }
}

#[test]
fn test_csv_has_one_row_per_computed_year() {
    let csv = analysis().export_to_string(ExportFormat::Csv).unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("year,current_ratio,cash_ratio,quick_ratio,"));
    assert!(lines[0].contains(",traditional_roe,"));
    assert!(lines[0].ends_with(",adjusted_roe"));
    assert!(lines[1].starts_with("2020,2,0.2,1.6,"));
    // no current liabilities in 2021
    assert!(lines[2].starts_with("2021,inf,inf,inf,"));
}

#[test]
fn test_json_roundtrips_the_analysis() {
    let original = analysis();
    let json = original.export_to_string(ExportFormat::PrettyJson).unwrap();
    let parsed: Analysis = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed, original);
    assert_eq!(parsed.series(Model::Ratios).gaps().len(), 1);
}

#[test]
fn test_summaries_and_report() {
    let analysis = analysis();
    let summaries = summarize_analysis(&analysis);
    assert_eq!(summaries.len(), 3);
    assert!(summaries[0].to_ascii_table().contains("Current ratio"));
    assert!(summaries[2].to_ascii_table().contains("ROIC %"));

    let report = ReportBuilder::new().analysis(analysis).build().unwrap();
    assert!(report.to_markdown().contains("## Adjusted DuPont"));
}

#[test]
fn test_chart_renders_to_any_writer() {
    let path = std::env::temp_dir().join("balanco_chart_test.txt");
    let file = std::fs::File::create(&path).unwrap();
    TerminalChart::new(file).render(analysis().series(Model::TraditionalDupont), "DuPont");

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("Asset turnover"));
    assert!(text.contains("2022 skipped: archive unavailable"));
    std::fs::remove_file(path).ok();
}
