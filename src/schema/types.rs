// src/schema/types.rs

use std::fmt;

/// Semantic role a column can play in an award extract.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash, PartialOrd, Ord)]
pub enum ColumnRole {
    Date,
    Amount,
    OrgName,
    InstituteCode,
    ActivityCode,
    TypeCode,
    TypeText,
    GrantIdentifier,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 8] = [
        ColumnRole::Date,
        ColumnRole::Amount,
        ColumnRole::OrgName,
        ColumnRole::InstituteCode,
        ColumnRole::ActivityCode,
        ColumnRole::TypeCode,
        ColumnRole::TypeText,
        ColumnRole::GrantIdentifier,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ColumnRole::Date => "date",
            ColumnRole::Amount => "amount",
            ColumnRole::OrgName => "organization",
            ColumnRole::InstituteCode => "institute",
            ColumnRole::ActivityCode => "activity code",
            ColumnRole::TypeCode => "type code",
            ColumnRole::TypeText => "type text",
            ColumnRole::GrantIdentifier => "grant identifier",
        }
    }

    /// The ranked candidate lists for this role.
    pub fn spec(&self) -> &'static RoleSpec {
        // ROLE_SPECS is laid out in declaration order
        &ROLE_SPECS[*self as usize]
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Candidate column names for one role.
/// `exact` is ranked most to least preferred; `contains` is the
/// substring fallback, tried against columns in header order.
#[derive(Debug)]
pub struct RoleSpec {
    pub role: ColumnRole,
    pub exact: &'static [&'static str],
    pub contains: &'static [&'static str],
}

pub static ROLE_SPECS: &[RoleSpec] = &[
    RoleSpec {
        role: ColumnRole::Date,
        exact: &[
            "award_notice_date",
            "notice_date",
            "action_date",
            "award_date",
            "date",
        ],
        contains: &["date"],
    },
    RoleSpec {
        role: ColumnRole::Amount,
        exact: &[
            // per-action / obligation style
            "award_amount",
            "award_amount_usd",
            "amount_this_action",
            "action_amount",
            "obligation_amount",
            "obligated_amount",
            "award_obligated_amount",
            "award_amount_current_usd",
            "current_amount",
            "transaction_amount",
            // total-style fallbacks
            "fy_total_cost",
            "total_cost",
            "total_cost_subproject",
            "total_cost_amount",
            "project_total_cost",
            "award_total_cost",
            "direct_cost",
            "direct_cost_amt",
            "direct_costs",
        ],
        contains: &["amount", "oblig", "cost", "dollar"],
    },
    RoleSpec {
        role: ColumnRole::OrgName,
        exact: &["org_name", "organization", "organization_name", "org_name_norm"],
        contains: &["org"],
    },
    RoleSpec {
        role: ColumnRole::InstituteCode,
        exact: &["admin_ic", "ic", "institute", "administrative_ic"],
        contains: &["ic"],
    },
    RoleSpec {
        role: ColumnRole::ActivityCode,
        exact: &["activity_code", "activity"],
        contains: &["activity"],
    },
    RoleSpec {
        role: ColumnRole::TypeCode,
        exact: &["type_code", "award_type_code"],
        contains: &[],
    },
    RoleSpec {
        role: ColumnRole::TypeText,
        exact: &["award_type", "type"],
        contains: &["type"],
    },
    RoleSpec {
        role: ColumnRole::GrantIdentifier,
        exact: &[
            "appl_id",
            "application_id",
            "core_project_num",
            "project_num",
            "full_project_num",
            "project_number",
            "grant_id",
            "grant_number",
            "award_id",
            "fain",
        ],
        contains: &["appl_id", "project_num", "grant_id", "award_id"],
    },
];

/// Name fragments that make an all-numeric column a plausible amount.
pub static AMOUNT_HINTS: &[&str] = &["amount", "oblig", "cost", "dollar", "total"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specs_follow_role_order() {
        assert_eq!(ROLE_SPECS.len(), ColumnRole::ALL.len());
        for role in ColumnRole::ALL {
            assert_eq!(role.spec().role, role);
        }
    }

    #[test]
    fn type_code_has_no_substring_fallback() {
        assert!(ColumnRole::TypeCode.spec().contains.is_empty());
    }
}
