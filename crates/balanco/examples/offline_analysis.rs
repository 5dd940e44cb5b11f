//! Runs the three models over two fiscal years held in memory.

use balanco::data::{LineItem, MemorySource, RowSet, StatementKind};
use balanco::output::{ExportFormat, Exporter, summarize_analysis};
use balanco::{AnalysisConfig, Indicator, analyze};

fn filing(source: MemorySource, year: i32, inventory: f64, net_income: f64) -> MemorySource {
    source
        .with(
            "9512",
            year,
            StatementKind::AssetsBalance,
            RowSet::new(vec![
                LineItem::new("1", "Ativo Total", 12000.0),
                LineItem::new("1.01", "Ativo Circulante", 5000.0),
                LineItem::new("1.01.01", "Caixa e Equivalentes de Caixa", 1200.0),
                LineItem::new("1.01.03", "Contas a Receber", 1500.0),
                LineItem::new("1.01.04", "Estoques", inventory),
            ]),
        )
        .with(
            "9512",
            year,
            StatementKind::LiabilitiesBalance,
            RowSet::new(vec![
                LineItem::new("2", "Passivo Total", 12000.0),
                LineItem::new("2.01", "Passivo Circulante", 3000.0),
                LineItem::new("2.01.02", "Fornecedores", 900.0),
                LineItem::new("2.01.04", "Empréstimos e Financiamentos", 1500.0),
                LineItem::new("2.02", "Passivo Não Circulante", 3000.0),
                LineItem::new("2.03", "Patrimônio Líquido Consolidado", 6000.0),
            ]),
        )
        .with(
            "9512",
            year,
            StatementKind::IncomeStatement,
            RowSet::new(vec![
                LineItem::new("3.01", "Receita de Venda de Bens e/ou Serviços", 15000.0),
                LineItem::new("3.02", "Custo dos Bens e/ou Serviços Vendidos", -9000.0),
                LineItem::new("3.04", "Despesas/Receitas Operacionais", -3500.0),
                LineItem::new("3.06.02", "Despesas Financeiras", -300.0),
                LineItem::new("3.11", "Lucro/Prejuízo Consolidado do Período", net_income),
            ]),
        )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Balanco Offline Analysis ===\n");

    let source = filing(filing(MemorySource::new(), 2022, 1800.0, 1200.0), 2023, 2200.0, 1500.0);
    let analysis = analyze(source, AnalysisConfig::new("9512", 2022, 2024)).await?;

    for summary in summarize_analysis(&analysis) {
        println!("{}", summary);
    }

    // 2024 has no filings in memory and shows up as a gap
    for (year, reason) in analysis.gaps() {
        println!("Skipped {}: {}", year, reason);
    }

    if let Some(roe) = analysis.value(2023, Indicator::ReturnOnEquity) {
        println!("\nROE 2023: {}", roe);
    }

    println!("\nCSV:\n{}", analysis.export_to_string(ExportFormat::Csv)?);
    Ok(())
}
