use crate::core::model::AccountType;
use crate::core::valuation::EntryValuation;
use std::collections::{BTreeMap, HashMap};

/// Sum of one category's converted values on one side of the balance sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub account_type: AccountType,
    pub value: f64,
    /// Share of the side's total, in percent.
    pub share: f64,
    pub accounts: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub currency: String,
    pub assets: Vec<CategoryTotal>,
    pub liabilities: Vec<CategoryTotal>,
    pub total_assets: f64,
    pub total_liabilities: f64,
}

/// Groups a valuation's accounts by type and category.
///
/// `labels` maps category ids to display names; unmapped categories keep their
/// id. Groups are sorted by value, largest first, then by name.
pub fn allocation(valuation: &EntryValuation, labels: &HashMap<String, String>) -> Allocation {
    let mut groups: BTreeMap<(AccountType, String), (f64, usize)> = BTreeMap::new();
    for line in &valuation.accounts {
        let label = labels
            .get(&line.category)
            .cloned()
            .unwrap_or_else(|| line.category.clone());
        let group = groups.entry((line.account_type, label)).or_insert((0.0, 0));
        group.0 += line.conversion.value;
        group.1 += 1;
    }

    let side = |account_type: AccountType, total: f64| -> Vec<CategoryTotal> {
        let mut totals: Vec<CategoryTotal> = groups
            .iter()
            .filter(|((kind, _), _)| *kind == account_type)
            .map(|((kind, category), (value, accounts))| CategoryTotal {
                category: category.clone(),
                account_type: *kind,
                value: *value,
                share: if total != 0.0 {
                    value / total * 100.0
                } else {
                    0.0
                },
                accounts: *accounts,
            })
            .collect();
        totals.sort_by(|a, b| {
            b.value
                .total_cmp(&a.value)
                .then_with(|| a.category.cmp(&b.category))
        });
        totals
    };

    Allocation {
        currency: valuation.currency.clone(),
        assets: side(AccountType::Asset, valuation.totals.total_assets),
        liabilities: side(AccountType::Liability, valuation.totals.total_liabilities),
        total_assets: valuation.totals.total_assets,
        total_liabilities: valuation.totals.total_liabilities,
    }
}
