use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use trading_journal_core::journal::TradeJournal;
use trading_journal_core::pnl::{realized_pnl, PnlInput};
use trading_journal_core::statistics::{
    group_by_period, period_profit_loss, win_rate, Period, PeriodKind,
};
use trading_journal_core::trade_log::{query_trades, SortField, SortOrder, TradeQuery};
use trading_journal_core::{StopLoss, TakeProfitLeg, Trade, TradeDraft, TradeId, TradeStatus};

// ===========================================================================
// Statistics over a journal
// ===========================================================================

fn dated(id: &str, date: &str, amount: Decimal, status: TradeStatus) -> Trade {
    TradeDraft {
        date: date.parse().unwrap(),
        pair: "EURUSD".into(),
        realized_amount: amount,
        status,
        ..TradeDraft::default()
    }
    .into_trade(TradeId::from(id))
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

#[test]
fn test_year_grouping_puts_both_trades_in_one_bucket() {
    let trades = vec![
        dated("1", "2024-03-01", dec!(10), TradeStatus::Win),
        dated("2", "2024-11-15", dec!(-5), TradeStatus::Loss),
    ];
    let groups = group_by_period(&trades, PeriodKind::Year);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups["2024"].len(), 2);
}

#[test]
fn test_every_trade_in_exactly_one_bucket() {
    let trades = vec![
        dated("1", "2024-03-01", dec!(1), TradeStatus::Win),
        dated("2", "2024-03-01", dec!(1), TradeStatus::Win),
        dated("3", "2024-03-31", dec!(1), TradeStatus::Win),
        dated("4", "2025-03-01", dec!(1), TradeStatus::Win),
    ];
    for kind in [PeriodKind::Day, PeriodKind::Month, PeriodKind::Year] {
        let groups = group_by_period(&trades, kind);
        let mut ids: Vec<&str> = groups
            .values()
            .flat_map(|bucket| bucket.iter().map(|t| t.id.as_str()))
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["1", "2", "3", "4"], "kind {kind}");
    }
    assert_eq!(group_by_period(&trades, PeriodKind::Day).len(), 3);
    assert_eq!(group_by_period(&trades, PeriodKind::Month).len(), 2);
}

// ---------------------------------------------------------------------------
// Period P/L
// ---------------------------------------------------------------------------

#[test]
fn test_period_profit_loss_by_day_month_year() {
    let trades = vec![
        dated("1", "2024-03-01", dec!(100), TradeStatus::Win),
        dated("2", "2024-03-20", dec!(-40), TradeStatus::Loss),
        dated("3", "2024-04-01", dec!(7), TradeStatus::Win),
        dated("4", "2023-03-01", dec!(1000), TradeStatus::Win),
    ];
    let day = Period::Day(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    assert_eq!(period_profit_loss(&trades, day), dec!(100));
    assert_eq!(
        period_profit_loss(&trades, Period::month(2024, 3).unwrap()),
        dec!(60)
    );
    assert_eq!(period_profit_loss(&trades, Period::Year(2024)), dec!(67));
    assert_eq!(period_profit_loss(&trades, Period::Year(2022)), Decimal::ZERO);
}

// ---------------------------------------------------------------------------
// Journal-level reads
// ---------------------------------------------------------------------------

#[test]
fn test_win_rate_on_empty_journal_is_zero() {
    let journal = TradeJournal::in_memory();
    assert_eq!(journal.win_rate(), Decimal::ZERO);
    assert_eq!(journal.average_risk_reward(), Decimal::ZERO);
    assert_eq!(win_rate(&[]), Decimal::ZERO);
}

#[test]
fn test_calculated_trades_feed_dashboard() {
    let mut journal = TradeJournal::in_memory();
    let baseline = journal.initial_account();

    for (date, sl_hit) in [("2025-01-10", false), ("2025-01-11", true), ("2025-02-01", false)] {
        let mut draft = TradeDraft {
            date: date.parse().unwrap(),
            pair: "XAUUSD".into(),
            take_profit_1: TakeProfitLeg::new(dec!(2), dec!(100), !sl_hit),
            take_profit_2: TakeProfitLeg::new(dec!(3), dec!(50), false),
            stop_loss: StopLoss::new(dec!(1), sl_hit),
            ..TradeDraft::default()
        };
        let input = PnlInput {
            stop_loss: draft.stop_loss.clone(),
            take_profit_1: draft.take_profit_1.clone(),
            take_profit_2: draft.take_profit_2.clone(),
            margin: draft.margin,
            initial_account_value: baseline,
        };
        let outcome = realized_pnl(&input).unwrap();
        draft.realized_amount = outcome.realized_amount;
        draft.realized_percentage = outcome.realized_percentage;
        draft.status = outcome.status;
        journal.add_trade(draft);
    }

    let summary = journal
        .summary(NaiveDate::from_ymd_opt(2025, 2, 14).unwrap())
        .unwrap();
    // +20,000 - 10,000 + 20,000
    assert_eq!(summary.total_profit_loss, dec!(30000));
    assert_eq!(summary.account_value, dec!(100030000));
    assert_eq!(summary.this_month_profit_loss, dec!(20000));
    assert_eq!(summary.this_year_profit_loss, dec!(30000));
    assert_eq!(summary.num_wins, 2);
    assert_eq!(summary.num_losses, 1);
    // (2 - 1 + 2) / 3
    assert_eq!(summary.average_risk_reward, dec!(1));

    let curve = journal.equity_curve(PeriodKind::Month);
    assert_eq!(curve.len(), 2);
    assert_eq!(curve[0].account_value, dec!(100010000));
    assert_eq!(curve[1].account_value, dec!(100030000));
}

#[test]
fn test_baseline_edit_changes_percentage_change_retroactively() {
    let mut journal = TradeJournal::in_memory();
    journal.add_trade(TradeDraft {
        pair: "EURUSD".into(),
        realized_amount: dec!(1000000),
        ..TradeDraft::default()
    });
    let today = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
    assert_eq!(journal.summary(today).unwrap().percentage_change, dec!(1));
    journal.set_initial_account(dec!(50000000)).unwrap();
    assert_eq!(journal.summary(today).unwrap().percentage_change, dec!(2));
}

// ---------------------------------------------------------------------------
// Trade log
// ---------------------------------------------------------------------------

#[test]
fn test_trade_log_sorted_by_margin() {
    let mut trades = vec![
        dated("1", "2024-01-01", dec!(0), TradeStatus::Breakeven),
        dated("2", "2024-01-02", dec!(0), TradeStatus::Breakeven),
    ];
    trades[0].margin = dec!(3000000);
    trades[1].margin = dec!(500000);
    let q = TradeQuery {
        sort_field: SortField::Margin,
        order: SortOrder::Asc,
        search: None,
    };
    let rows = query_trades(&trades, &q);
    assert_eq!(rows[0].id.as_str(), "2");
}
