//! Property-based tests for ledger row validation rules.

use chrono::NaiveDate;
use comptoir_shared::types::{ClientId, EmployeeId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{LedgerAccount, NewLedgerRow, RowKind, StoreNumber};
use super::validation::validate_new_row;

/// Strategy to generate a non-negative amount (0.00 to 1,000,000.00).
fn non_negative_amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a negative amount.
fn negative_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(-cents, 2))
}

/// Strategy to generate an account of any ledger kind.
fn any_account() -> impl Strategy<Value = LedgerAccount> {
    prop_oneof![
        Just(LedgerAccount::Client(ClientId::new())),
        Just(LedgerAccount::Employee(EmployeeId::new())),
        (1u16..5).prop_map(|store| LedgerAccount::stock(StoreNumber(store), "Maïs")),
    ]
}

fn make_input(account: LedgerAccount, credit: Option<Decimal>, debit: Option<Decimal>) -> NewLedgerRow {
    NewLedgerRow {
        account,
        sort_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        row_kind: RowKind::Movement,
        credit,
        debit,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_negative_credit_always_rejected(
        account in any_account(),
        credit in negative_amount(),
        debit in prop::option::of(non_negative_amount()),
    ) {
        let result = validate_new_row(&make_input(account, Some(credit), debit));
        let is_negative = matches!(result, Err(LedgerError::NegativeAmount { .. }));
        prop_assert!(is_negative);
    }

    #[test]
    fn prop_negative_debit_always_rejected(
        account in any_account(),
        credit in prop::option::of(non_negative_amount()),
        debit in negative_amount(),
    ) {
        let result = validate_new_row(&make_input(account, credit, Some(debit)));
        let is_negative = matches!(result, Err(LedgerError::NegativeAmount { .. }));
        prop_assert!(is_negative);
    }

    #[test]
    fn prop_movement_with_an_amount_accepted(
        account in any_account(),
        amount in non_negative_amount(),
        as_credit in any::<bool>(),
    ) {
        let input = if as_credit {
            make_input(account, Some(amount), None)
        } else {
            make_input(account, None, Some(amount))
        };
        prop_assert!(validate_new_row(&input).is_ok());
    }

    #[test]
    fn prop_only_client_ledgers_take_settlements(
        account in any_account(),
        amount in non_negative_amount(),
    ) {
        let is_client = matches!(account, LedgerAccount::Client(_));
        let mut input = make_input(account, Some(amount), None);
        input.row_kind = RowKind::Settlement;
        prop_assert_eq!(validate_new_row(&input).is_ok(), is_client);
    }
}
