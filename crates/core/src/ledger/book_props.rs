//! Property-based tests for the account book.
//!
//! Whatever sequence of inserts, moves and deletes is applied, cascading from
//! the first affected key over a consistent book must leave the same
//! balances as recomputing the whole account from its first row, and a full
//! recompute must repair any stored balances.

use chrono::NaiveDate;
use comptoir_shared::types::{ClientId, LedgerRowId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::balance::running_balances;
use super::book::AccountBook;
use super::types::{LedgerAccount, LedgerRow, RowKind};

/// Strategy for an optional amount from 0.00 to 10,000.00.
fn amount() -> impl Strategy<Value = Option<Decimal>> {
    prop::option::of((0i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2)))
}

/// Strategy for a row kind, mostly movements.
fn row_kind() -> impl Strategy<Value = RowKind> {
    prop_oneof![4 => Just(RowKind::Movement), 1 => Just(RowKind::Settlement)]
}

/// Strategy for (day offset, kind, credit, debit).
fn row_parts() -> impl Strategy<Value = (u32, RowKind, Option<Decimal>, Option<Decimal>)> {
    (0u32..60, row_kind(), amount(), amount())
}

fn make_row(
    account: &LedgerAccount,
    seq: i64,
    (day, row_kind, credit, debit): (u32, RowKind, Option<Decimal>, Option<Decimal>),
) -> LedgerRow {
    LedgerRow {
        id: LedgerRowId::new(),
        account: account.clone(),
        sort_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(u64::from(day)),
        sequence_id: seq,
        row_kind,
        credit,
        debit,
        balance: Decimal::ZERO,
    }
}

/// Builds a consistent book by inserting rows one at a time with cascades.
fn build_book(parts: Vec<(u32, RowKind, Option<Decimal>, Option<Decimal>)>) -> AccountBook {
    let account = LedgerAccount::Client(ClientId::new());
    let mut book = AccountBook::new(account.clone());
    for (seq, part) in parts.into_iter().enumerate() {
        let key = book.insert(make_row(&account, i64::try_from(seq).unwrap() + 1, part));
        book.cascade_from(&key).unwrap();
    }
    book
}

fn stored_balances(book: &AccountBook) -> Vec<Decimal> {
    book.rows().map(|row| row.balance).collect()
}

fn expected_balances(book: &AccountBook) -> Vec<Decimal> {
    let rows: Vec<LedgerRow> = book.rows().cloned().collect();
    running_balances(&rows).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Incremental cascade equals full recompute
    // =========================================================================

    #[test]
    fn prop_incremental_inserts_match_full_recompute(
        parts in prop::collection::vec(row_parts(), 1..40)
    ) {
        let book = build_book(parts);
        prop_assert_eq!(stored_balances(&book), expected_balances(&book));
    }

    #[test]
    fn prop_closing_balance_is_credit_minus_debit(
        parts in prop::collection::vec(row_parts(), 1..40)
    ) {
        let book = build_book(parts);
        let summary = super::balance::AccountSummary::from_book(&book).unwrap();
        prop_assert!(summary.is_consistent());
    }

    #[test]
    fn prop_settlements_follow_every_movement(
        parts in prop::collection::vec(row_parts(), 1..40)
    ) {
        let book = build_book(parts);
        let kinds: Vec<RowKind> = book.rows().map(|row| row.row_kind).collect();
        let first_settlement = kinds.iter().position(|k| *k == RowKind::Settlement);
        if let Some(pos) = first_settlement {
            prop_assert!(kinds[pos..].iter().all(|k| *k == RowKind::Settlement));
        }
    }

    // =========================================================================
    // Moves and deletes
    // =========================================================================

    #[test]
    fn prop_moving_a_row_matches_full_recompute(
        parts in prop::collection::vec(row_parts(), 2..30),
        pick in any::<prop::sample::Index>(),
        new_day in 0u32..60,
        new_credit in amount(),
    ) {
        let mut book = build_book(parts);
        let ids: Vec<LedgerRowId> = book.rows().map(|row| row.id).collect();
        let target = book.get(ids[pick.index(ids.len())]).cloned().unwrap();

        let mut moved = target.clone();
        moved.sort_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(u64::from(new_day));
        moved.credit = new_credit;
        let start = book.replace(moved).unwrap();
        book.cascade_from(&start).unwrap();

        prop_assert_eq!(stored_balances(&book), expected_balances(&book));
    }

    #[test]
    fn prop_delete_equals_never_inserted(
        parts in prop::collection::vec(row_parts(), 2..30),
        pick in any::<prop::sample::Index>(),
    ) {
        let victim = pick.index(parts.len());
        let account = LedgerAccount::Client(ClientId::new());

        let mut with_row = AccountBook::new(account.clone());
        let mut without_row = AccountBook::new(account.clone());
        let mut victim_id = None;
        for (i, part) in parts.into_iter().enumerate() {
            let row = make_row(&account, i64::try_from(i).unwrap() + 1, part);
            if i == victim {
                victim_id = Some(row.id);
            } else {
                let key = without_row.insert(row.clone());
                without_row.cascade_from(&key).unwrap();
            }
            let key = with_row.insert(row);
            with_row.cascade_from(&key).unwrap();
        }

        let removed = with_row.remove(victim_id.unwrap()).unwrap();
        with_row.cascade_from(&removed.order_key()).unwrap();

        prop_assert_eq!(stored_balances(&with_row), stored_balances(&without_row));
    }

    #[test]
    fn prop_recompute_is_idempotent(
        parts in prop::collection::vec(row_parts(), 1..40)
    ) {
        let mut book = build_book(parts);
        prop_assert!(book.recompute_all().unwrap().is_empty());
    }

    #[test]
    fn prop_recompute_repairs_any_stored_balances(
        parts in prop::collection::vec(row_parts(), 1..40),
        stale in prop::collection::vec(-1_000_000i64..1_000_000i64, 40),
    ) {
        let book = build_book(parts);
        let account = book.account().clone();
        let scrambled = book.rows().zip(&stale).map(|(row, cents)| LedgerRow {
            balance: Decimal::new(*cents, 2),
            ..row.clone()
        });
        let mut repaired = AccountBook::from_rows(account, scrambled).unwrap();

        repaired.recompute_all().unwrap();

        prop_assert_eq!(stored_balances(&repaired), expected_balances(&book));
    }
}
