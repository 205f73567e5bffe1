//! Running-ledger domain types.
//!
//! A ledger row is one dated movement in an account. The three record
//! pathways (client loadings, employee expenses, stock movements) all map
//! onto [`LedgerRow`]; the balance field is derived and only ever written by
//! the engine.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use comptoir_shared::types::{ClientId, EmployeeId, LedgerRowId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error::LedgerError;
use super::ordering::OrderKey;

/// The family of ledger an account belongs to.
///
/// Each family carries its own validation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    /// Client loading account.
    Client,
    /// Employee expense account.
    Employee,
    /// Stock count for one commodity in one store.
    Stock,
}

impl LedgerKind {
    /// Returns true if every row must carry a credit or a debit.
    #[must_use]
    pub const fn requires_amount(self) -> bool {
        matches!(self, Self::Client | Self::Employee)
    }

    /// Returns true if the running balance may never go below zero.
    #[must_use]
    pub const fn forbids_negative_balance(self) -> bool {
        matches!(self, Self::Stock)
    }

    /// Returns true if settlement rows may be posted.
    #[must_use]
    pub const fn allows_settlement(self) -> bool {
        matches!(self, Self::Client)
    }

    /// Returns the storage name of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Employee => "employee",
            Self::Stock => "stock",
        }
    }
}

impl fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a row is an ordinary movement or a period settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    /// Ordinary dated movement.
    #[default]
    Movement,
    /// Settlement; sorts after every movement row of the account.
    Settlement,
}

impl RowKind {
    /// Returns the leading component of the ordering key.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Movement => 0,
            Self::Settlement => 1,
        }
    }

    /// Returns the storage name of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Movement => "movement",
            Self::Settlement => "settlement",
        }
    }
}

impl FromStr for RowKind {
    type Err = ParseAccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movement" => Ok(Self::Movement),
            "settlement" => Ok(Self::Settlement),
            other => Err(ParseAccountError::UnknownRowKind(other.to_string())),
        }
    }
}

/// Store (magasin) number holding stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreNumber(pub u16);

impl fmt::Display for StoreNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Commodity name of a stock account, always stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Commodity(String);

impl Commodity {
    /// Builds a commodity name, trimming surrounding whitespace.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_string())
    }

    /// Returns the trimmed name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Commodity {
    fn from(name: String) -> Self {
        Self::new(&name)
    }
}

impl From<Commodity> for String {
    fn from(commodity: Commodity) -> Self {
        commodity.0
    }
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The entity owning a running balance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerAccount {
    /// A client's loading account.
    Client(ClientId),
    /// An employee's expense account.
    Employee(EmployeeId),
    /// Sack count of one commodity held in one store.
    Stock {
        /// Store holding the sacks.
        store: StoreNumber,
        /// Commodity name (e.g. "Karité", "Maïs").
        commodity: Commodity,
    },
}

impl LedgerAccount {
    /// Builds a stock account, trimming the commodity name.
    #[must_use]
    pub fn stock(store: StoreNumber, commodity: &str) -> Self {
        Self::Stock {
            store,
            commodity: Commodity::new(commodity),
        }
    }

    /// Returns the ledger family of this account.
    #[must_use]
    pub const fn kind(&self) -> LedgerKind {
        match self {
            Self::Client(_) => LedgerKind::Client,
            Self::Employee(_) => LedgerKind::Employee,
            Self::Stock { .. } => LedgerKind::Stock,
        }
    }
}

/// Renders the storage key: `client:<uuid>`, `employee:<uuid>` or
/// `stock:<store>:<commodity>`.
impl fmt::Display for LedgerAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client(id) => write!(f, "client:{id}"),
            Self::Employee(id) => write!(f, "employee:{id}"),
            Self::Stock { store, commodity } => write!(f, "stock:{store}:{commodity}"),
        }
    }
}

/// Error parsing a stored account key or row kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseAccountError {
    /// The key prefix is not a known ledger kind.
    #[error("Unknown ledger account key: {0}")]
    UnknownKey(String),

    /// The identifier part of the key is malformed.
    #[error("Malformed ledger account key: {0}")]
    Malformed(String),

    /// Unknown row kind name.
    #[error("Unknown row kind: {0}")]
    UnknownRowKind(String),
}

impl FromStr for LedgerAccount {
    type Err = ParseAccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, rest) = s
            .split_once(':')
            .ok_or_else(|| ParseAccountError::UnknownKey(s.to_string()))?;

        match prefix {
            "client" => ClientId::from_str(rest)
                .map(Self::Client)
                .map_err(|_| ParseAccountError::Malformed(s.to_string())),
            "employee" => EmployeeId::from_str(rest)
                .map(Self::Employee)
                .map_err(|_| ParseAccountError::Malformed(s.to_string())),
            "stock" => {
                let (store, commodity) = rest
                    .split_once(':')
                    .ok_or_else(|| ParseAccountError::Malformed(s.to_string()))?;
                let store = store
                    .parse::<u16>()
                    .map_err(|_| ParseAccountError::Malformed(s.to_string()))?;
                if commodity.trim().is_empty() {
                    return Err(ParseAccountError::Malformed(s.to_string()));
                }
                Ok(Self::stock(StoreNumber(store), commodity))
            }
            _ => Err(ParseAccountError::UnknownKey(s.to_string())),
        }
    }
}

/// A persisted ledger row with its derived balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    /// Row identifier.
    pub id: LedgerRowId,
    /// Owning account.
    pub account: LedgerAccount,
    /// Primary ordering date.
    pub sort_date: NaiveDate,
    /// Insertion sequence, used as the tie break.
    pub sequence_id: i64,
    /// Movement or settlement.
    pub row_kind: RowKind,
    /// Amount increasing the balance.
    pub credit: Option<Decimal>,
    /// Amount decreasing the balance.
    pub debit: Option<Decimal>,
    /// Running balance after this row.
    pub balance: Decimal,
}

impl LedgerRow {
    /// Creates a row from caller input. The balance starts at zero until the
    /// account is recomputed.
    #[must_use]
    pub fn from_input(id: LedgerRowId, input: NewLedgerRow, sequence_id: i64) -> Self {
        Self {
            id,
            account: input.account,
            sort_date: input.sort_date,
            sequence_id,
            row_kind: input.row_kind,
            credit: input.credit,
            debit: input.debit,
            balance: Decimal::ZERO,
        }
    }

    /// Returns this row's position in its account.
    #[must_use]
    pub fn order_key(&self) -> OrderKey {
        OrderKey::new(self.row_kind, self.sort_date, self.sequence_id)
    }

    /// Returns `credit - debit`, missing amounts counting as zero.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AmountOverflow` if the difference is out of range.
    pub fn delta(&self) -> Result<Decimal, LedgerError> {
        super::balance::row_delta(self.credit, self.debit)
    }
}

/// Caller input for a new ledger row.
///
/// Carries no balance; balances are always derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLedgerRow {
    /// Owning account.
    pub account: LedgerAccount,
    /// Primary ordering date.
    pub sort_date: NaiveDate,
    /// Movement or settlement.
    pub row_kind: RowKind,
    /// Amount increasing the balance.
    pub credit: Option<Decimal>,
    /// Amount decreasing the balance.
    pub debit: Option<Decimal>,
}

/// Partial update of a ledger row.
///
/// `None` leaves a field untouched; `Some(None)` clears an amount.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerRowPatch {
    /// New ordering date.
    pub sort_date: Option<NaiveDate>,
    /// New row kind.
    pub row_kind: Option<RowKind>,
    /// New credit amount.
    pub credit: Option<Option<Decimal>>,
    /// New debit amount.
    pub debit: Option<Option<Decimal>>,
}

impl LedgerRowPatch {
    /// Returns true if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sort_date.is_none()
            && self.row_kind.is_none()
            && self.credit.is_none()
            && self.debit.is_none()
    }

    /// Applies the patch to a row, keeping its identity, account, sequence
    /// and (stale) balance.
    #[must_use]
    pub fn apply(&self, row: &LedgerRow) -> LedgerRow {
        LedgerRow {
            sort_date: self.sort_date.unwrap_or(row.sort_date),
            row_kind: self.row_kind.unwrap_or(row.row_kind),
            credit: self.credit.unwrap_or(row.credit),
            debit: self.debit.unwrap_or(row.debit),
            ..row.clone()
        }
    }
}

/// A balance rewritten by a recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceChange {
    /// The row whose balance changed.
    pub row_id: LedgerRowId,
    /// Balance before the recompute.
    pub previous: Decimal,
    /// Balance after the recompute.
    pub current: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(LedgerKind::Client, true, false, true)]
    #[case(LedgerKind::Employee, true, false, false)]
    #[case(LedgerKind::Stock, false, true, false)]
    fn test_ledger_kind_rules(
        #[case] kind: LedgerKind,
        #[case] requires_amount: bool,
        #[case] forbids_negative: bool,
        #[case] allows_settlement: bool,
    ) {
        assert_eq!(kind.requires_amount(), requires_amount);
        assert_eq!(kind.forbids_negative_balance(), forbids_negative);
        assert_eq!(kind.allows_settlement(), allows_settlement);
    }

    #[test]
    fn test_account_key_round_trip() {
        let accounts = [
            LedgerAccount::Client(ClientId::new()),
            LedgerAccount::Employee(EmployeeId::new()),
            LedgerAccount::stock(StoreNumber(2), "Maïs"),
        ];
        for account in accounts {
            let parsed: LedgerAccount = account.to_string().parse().unwrap();
            assert_eq!(parsed, account);
        }
    }

    #[test]
    fn test_stock_account_built_directly_is_trimmed() {
        let direct = LedgerAccount::Stock {
            store: StoreNumber(3),
            commodity: Commodity::from(" Sésame ".to_string()),
        };

        assert_eq!(direct.to_string(), "stock:3:Sésame");
        assert_eq!(direct, LedgerAccount::stock(StoreNumber(3), "Sésame"));
        assert_eq!(direct.to_string().parse::<LedgerAccount>().unwrap(), direct);

        let decoded: LedgerAccount = serde_json::from_value(
            serde_json::json!({ "stock": { "store": 3, "commodity": "  Sésame" } }),
        )
        .unwrap();
        assert_eq!(decoded, direct);
    }

    #[test]
    fn test_stock_account_keeps_colons_in_commodity() {
        let parsed: LedgerAccount = "stock:1:Karité: grade A".parse().unwrap();
        assert_eq!(parsed, LedgerAccount::stock(StoreNumber(1), "Karité: grade A"));
    }

    #[rstest]
    #[case("supplier:1")]
    #[case("client")]
    fn test_unknown_account_key(#[case] key: &str) {
        assert!(matches!(
            key.parse::<LedgerAccount>(),
            Err(ParseAccountError::UnknownKey(_))
        ));
    }

    #[rstest]
    #[case("client:not-a-uuid")]
    #[case("stock:x:Maïs")]
    #[case("stock:1:  ")]
    #[case("stock:1")]
    fn test_malformed_account_key(#[case] key: &str) {
        assert!(matches!(
            key.parse::<LedgerAccount>(),
            Err(ParseAccountError::Malformed(_))
        ));
    }

    #[test]
    fn test_patch_apply_keeps_identity() {
        let row = LedgerRow {
            id: LedgerRowId::new(),
            account: LedgerAccount::Employee(EmployeeId::new()),
            sort_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            sequence_id: 7,
            row_kind: RowKind::Movement,
            credit: Some(dec!(500)),
            debit: Some(dec!(120)),
            balance: dec!(380),
        };
        let patch = LedgerRowPatch {
            debit: Some(None),
            sort_date: Some(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()),
            ..Default::default()
        };

        let updated = patch.apply(&row);

        assert_eq!(updated.id, row.id);
        assert_eq!(updated.sequence_id, 7);
        assert_eq!(updated.credit, Some(dec!(500)));
        assert_eq!(updated.debit, None);
        assert_eq!(updated.sort_date, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        assert!(!patch.is_empty());
        assert!(LedgerRowPatch::default().is_empty());
    }

    #[test]
    fn test_row_kind_parse() {
        assert_eq!("settlement".parse::<RowKind>().unwrap(), RowKind::Settlement);
        assert_eq!(RowKind::Movement.as_str().parse::<RowKind>().unwrap(), RowKind::Movement);
        assert!("reglement".parse::<RowKind>().is_err());
    }

    #[test]
    fn test_json_shape() {
        let account = LedgerAccount::stock(StoreNumber(2), "Maïs");
        assert_eq!(
            serde_json::to_value(&account).unwrap(),
            serde_json::json!({ "stock": { "store": 2, "commodity": "Maïs" } })
        );
        assert_eq!(
            serde_json::to_value(RowKind::Settlement).unwrap(),
            serde_json::json!("settlement")
        );
    }
}
