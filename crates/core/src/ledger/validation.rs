//! Business rule validation for ledger rows.
//!
//! Each rule is a small typed function so callers can run exactly the checks
//! that apply to them. All of them run before anything is persisted.

use rust_decimal::Decimal;

use super::book::AccountBook;
use super::error::{AmountField, LedgerError};
use super::types::{LedgerAccount, LedgerKind, LedgerRow, LedgerRowPatch, NewLedgerRow, RowKind};

/// Rejects negative amounts. Zero and missing amounts are accepted.
pub fn validate_amount(field: AmountField, amount: Option<Decimal>) -> Result<(), LedgerError> {
    match amount {
        Some(value) if value < Decimal::ZERO => Err(LedgerError::NegativeAmount { field }),
        _ => Ok(()),
    }
}

/// Client and employee rows must carry a credit or a debit.
pub fn validate_presence(
    kind: LedgerKind,
    credit: Option<Decimal>,
    debit: Option<Decimal>,
) -> Result<(), LedgerError> {
    if kind.requires_amount() && credit.is_none() && debit.is_none() {
        return Err(LedgerError::EmptyLedgerRow);
    }
    Ok(())
}

/// Settlement rows are only valid where the ledger allows them.
pub fn validate_row_kind(kind: LedgerKind, row_kind: RowKind) -> Result<(), LedgerError> {
    if row_kind == RowKind::Settlement && !kind.allows_settlement() {
        return Err(LedgerError::SettlementNotAllowed(kind));
    }
    Ok(())
}

/// Validates caller input for a new row.
pub fn validate_new_row(input: &NewLedgerRow) -> Result<(), LedgerError> {
    let kind = input.account.kind();
    validate_amount(AmountField::Credit, input.credit)?;
    validate_amount(AmountField::Debit, input.debit)?;
    validate_presence(kind, input.credit, input.debit)?;
    validate_row_kind(kind, input.row_kind)
}

/// Validates the amounts carried by a patch, before the row is loaded.
pub fn validate_patch(patch: &LedgerRowPatch) -> Result<(), LedgerError> {
    validate_amount(AmountField::Credit, patch.credit.flatten())?;
    validate_amount(AmountField::Debit, patch.debit.flatten())
}

/// Validates a row after a patch has been applied.
pub fn validate_row(row: &LedgerRow) -> Result<(), LedgerError> {
    let kind = row.account.kind();
    validate_amount(AmountField::Credit, row.credit)?;
    validate_amount(AmountField::Debit, row.debit)?;
    validate_presence(kind, row.credit, row.debit)?;
    validate_row_kind(kind, row.row_kind)
}

/// Refuses to work on accounts larger than the configured bound.
pub fn validate_row_limit(
    account: &LedgerAccount,
    rows: usize,
    limit: usize,
) -> Result<(), LedgerError> {
    if rows > limit {
        return Err(LedgerError::ResourceExhausted {
            account: account.clone(),
            rows,
            limit,
        });
    }
    Ok(())
}

/// On stock ledgers, no balance of the recomputed chain may be negative.
pub fn validate_stock_chain(book: &AccountBook) -> Result<(), LedgerError> {
    if !book.account().kind().forbids_negative_balance() {
        return Ok(());
    }
    let Some(start) = book.first_key() else {
        return Ok(());
    };
    match book.first_negative_from(&start) {
        Some(row) => Err(LedgerError::InsufficientStock {
            row_id: row.id,
            balance: row.balance,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::StoreNumber;
    use chrono::NaiveDate;
    use comptoir_shared::types::{ClientId, EmployeeId};
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn new_row(account: LedgerAccount, credit: Option<Decimal>, debit: Option<Decimal>) -> NewLedgerRow {
        NewLedgerRow {
            account,
            sort_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            row_kind: RowKind::Movement,
            credit,
            debit,
        }
    }

    #[test]
    fn test_client_row_without_amounts_is_empty() {
        let input = new_row(LedgerAccount::Client(ClientId::new()), None, None);
        assert!(matches!(validate_new_row(&input), Err(LedgerError::EmptyLedgerRow)));
    }

    #[test]
    fn test_employee_row_without_amounts_is_empty() {
        let input = new_row(LedgerAccount::Employee(EmployeeId::new()), None, None);
        assert!(matches!(validate_new_row(&input), Err(LedgerError::EmptyLedgerRow)));
    }

    #[test]
    fn test_stock_row_without_amounts_is_allowed() {
        let input = new_row(LedgerAccount::stock(StoreNumber(1), "Maïs"), None, None);
        assert!(validate_new_row(&input).is_ok());
    }

    #[test]
    fn test_zero_amount_counts_as_present() {
        let input = new_row(LedgerAccount::Client(ClientId::new()), Some(Decimal::ZERO), None);
        assert!(validate_new_row(&input).is_ok());
    }

    #[rstest]
    #[case(Some(dec!(-1)), None, AmountField::Credit)]
    #[case(None, Some(dec!(-0.01)), AmountField::Debit)]
    #[case(Some(dec!(-5)), Some(dec!(-5)), AmountField::Credit)]
    fn test_negative_amounts(
        #[case] credit: Option<Decimal>,
        #[case] debit: Option<Decimal>,
        #[case] expected: AmountField,
    ) {
        let input = new_row(LedgerAccount::Client(ClientId::new()), credit, debit);
        match validate_new_row(&input) {
            Err(LedgerError::NegativeAmount { field }) => assert_eq!(field, expected),
            other => panic!("expected NegativeAmount, got {other:?}"),
        }
    }

    #[rstest]
    #[case(LedgerAccount::Employee(EmployeeId::new()))]
    #[case(LedgerAccount::stock(StoreNumber(3), "Karité"))]
    fn test_settlement_only_on_client_ledgers(#[case] account: LedgerAccount) {
        let mut input = new_row(account, Some(dec!(10)), None);
        input.row_kind = RowKind::Settlement;
        assert!(matches!(
            validate_new_row(&input),
            Err(LedgerError::SettlementNotAllowed(_))
        ));
    }

    #[test]
    fn test_patch_with_negative_debit_rejected() {
        let patch = LedgerRowPatch {
            debit: Some(Some(dec!(-2))),
            ..Default::default()
        };
        assert!(matches!(
            validate_patch(&patch),
            Err(LedgerError::NegativeAmount {
                field: AmountField::Debit
            })
        ));
        let clearing = LedgerRowPatch {
            debit: Some(None),
            ..Default::default()
        };
        assert!(validate_patch(&clearing).is_ok());
    }

    fn book_with(account: &LedgerAccount, amounts: &[(Option<Decimal>, Option<Decimal>)]) -> AccountBook {
        let mut book = AccountBook::new(account.clone());
        for (seq, (credit, debit)) in (1i64..).zip(amounts) {
            book.insert(LedgerRow {
                id: comptoir_shared::types::LedgerRowId::new(),
                account: account.clone(),
                sort_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
                sequence_id: seq,
                row_kind: RowKind::Movement,
                credit: *credit,
                debit: *debit,
                balance: Decimal::ZERO,
            });
        }
        book.recompute_all().unwrap();
        book
    }

    #[test]
    fn test_stock_chain_checks_every_row() {
        let stock = LedgerAccount::stock(StoreNumber(5), "Maïs");
        // dips below zero in the middle, recovers at the end
        let book = book_with(
            &stock,
            &[(Some(dec!(3)), None), (None, Some(dec!(4))), (Some(dec!(10)), None)],
        );
        assert!(matches!(
            validate_stock_chain(&book),
            Err(LedgerError::InsufficientStock { balance, .. }) if balance == dec!(-1)
        ));

        let client = LedgerAccount::Client(ClientId::new());
        assert!(validate_stock_chain(&book_with(&client, &[(None, Some(dec!(4)))])).is_ok());
        assert!(validate_stock_chain(&AccountBook::new(stock)).is_ok());
    }

    #[test]
    fn test_row_limit() {
        let account = LedgerAccount::Client(ClientId::new());
        assert!(validate_row_limit(&account, 10, 10).is_ok());
        assert!(matches!(
            validate_row_limit(&account, 11, 10),
            Err(LedgerError::ResourceExhausted { rows: 11, limit: 10, .. })
        ));
    }
}
