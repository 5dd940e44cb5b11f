//! Integration tests for the ratio engine, from row-sets to indicators

use approx::assert_abs_diff_eq;
use balanco_data::{LineItem, RowSet};
use balanco_ratios::{
    AccountMatcher, AccountSums, AdjustedDupont, Calculator, FiscalStatements, Indicator,
    PeriodState, RatioCalculator, TraditionalDupont,
};

fn flat_year(fiscal_year: i32) -> FiscalStatements {
    FiscalStatements::new(
        fiscal_year,
        RowSet::new(vec![
            LineItem::new("1", "Ativo Total", 10000.0),
            LineItem::new("1.01", "Ativo Circulante", 4000.0),
            LineItem::new("1.01.01", "Caixa e Equivalentes de Caixa", 1000.0),
            LineItem::new("1.01.03", "Contas a Receber", 1500.0),
            LineItem::new("1.01.04", "Estoques", 800.0),
        ]),
        RowSet::new(vec![
            LineItem::new("2", "Passivo Total", 10000.0),
            LineItem::new("2.01", "Passivo Circulante", 2500.0),
            LineItem::new("2.01.02", "Fornecedores", 600.0),
            LineItem::new("2.02", "Passivo Não Circulante", 1500.0),
            LineItem::new("2.03", "Patrimônio Líquido Consolidado", 6000.0),
        ]),
        RowSet::new(vec![
            LineItem::new("3.01", "Receita de Venda de Bens e/ou Serviços", 9000.0),
            LineItem::new("3.02", "Custo dos Bens e/ou Serviços Vendidos", -5400.0),
            LineItem::new("3.04", "Despesas/Receitas Operacionais", -1800.0),
            LineItem::new("3.11", "Lucro/Prejuízo Consolidado do Período", 1140.0),
        ]),
    )
}

#[test]
fn test_roe_agrees_across_models() {
    let matcher = AccountMatcher::cvm().unwrap();
    let ratios = RatioCalculator::new();
    let traditional = TraditionalDupont::new();
    let adjusted = AdjustedDupont::new();

    let mut ratio_state = PeriodState::Absent;
    let mut traditional_state = PeriodState::Absent;
    let mut adjusted_state = PeriodState::Absent;

    for year in [2021, 2022] {
        let statements = flat_year(year);
        let (r, next_r) = ratios.compute_statements(&matcher, &statements, &ratio_state);
        let (t, next_t) = traditional.compute_statements(&matcher, &statements, &traditional_state);
        let (a, next_a) = adjusted.compute_statements(&matcher, &statements, &adjusted_state);
        ratio_state = next_r;
        traditional_state = next_t;
        adjusted_state = next_a;

        let roe = r.finite(Indicator::ReturnOnEquity).unwrap();
        assert_abs_diff_eq!(
            roe,
            t.finite(Indicator::TraditionalReturnOnEquity).unwrap(),
            epsilon = 0.1
        );
        assert_abs_diff_eq!(
            roe,
            a.finite(Indicator::AdjustedReturnOnEquity).unwrap(),
            epsilon = 0.1
        );
        // 1140 / 6000
        assert_abs_diff_eq!(roe, 19.0, epsilon = 1e-9);
    }
}

#[test]
fn test_supplier_fallback_feeds_payables() {
    let matcher = AccountMatcher::cvm().unwrap();
    let mut statements = flat_year(2021);
    statements.liabilities = RowSet::new(vec![
        LineItem::new("2.01", "Passivo Circulante", 2500.0),
        LineItem::new("2.01.02", "Obrigações Comerciais", 5000.0),
    ]);

    let sums = AccountSums::extract(&matcher, &statements);
    assert_eq!(sums.suppliers, 5000.0);

    let (set, state) = RatioCalculator::new().compute(&sums, &PeriodState::Absent);
    // 5000 / 5400 * 365
    assert_eq!(set.finite(Indicator::DaysPayables), Some(338.0));
    assert_eq!(state.closing().unwrap().payables, 5000.0);
}

#[test]
fn test_first_year_uses_current_values_only() {
    let matcher = AccountMatcher::cvm().unwrap();
    let (set, _) =
        RatioCalculator::new().compute_statements(&matcher, &flat_year(2021), &PeriodState::Absent);

    // 800 / 5400 * 365
    assert_eq!(set.finite(Indicator::DaysInventory), Some(54.0));
    // 1500 / 9000 * 365
    assert_eq!(set.finite(Indicator::DaysReceivables), Some(61.0));
    // 600 / 5400 * 365
    assert_eq!(set.finite(Indicator::DaysPayables), Some(41.0));
    assert_eq!(set.finite(Indicator::CurrentRatio), Some(1.6));
}

#[test]
fn test_accent_and_spacing_drift_still_matches() {
    let matcher = AccountMatcher::cvm().unwrap();
    let mut statements = flat_year(2021);
    statements.liabilities = RowSet::new(vec![
        LineItem::new("2.01", "PASSIVO CIRCULANTE", 2500.0),
        LineItem::new("2.03", "PatrimonioLiquidoConsolidado", 6000.0),
    ]);

    let sums = AccountSums::extract(&matcher, &statements);
    assert_eq!(sums.current_liabilities, 2500.0);
    assert_eq!(sums.equity, 6000.0);
}
