// src/normalize/roles.rs

use std::fmt;

/// Semantic meaning assigned to a raw column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    Rank,
    Title,
    Year,
    Gross,
    Peak,
    Unmapped,
}

impl ColumnRole {
    pub fn as_str(&self) -> &str {
        match self {
            ColumnRole::Rank => "Rank",
            ColumnRole::Title => "Title",
            ColumnRole::Year => "Year",
            ColumnRole::Gross => "Gross",
            ColumnRole::Peak => "Peak",
            ColumnRole::Unmapped => "Unmapped",
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evaluated top to bottom; the first rule with a matching substring decides.
const ROLE_RULES: &[(ColumnRole, &[&str])] = &[
    (ColumnRole::Rank, &["rank"]),
    (ColumnRole::Title, &["title", "film"]),
    (ColumnRole::Year, &["year"]),
    (ColumnRole::Gross, &["worldwide gross", "total gross"]),
    (ColumnRole::Peak, &["peak"]),
];

/// Candidate role for a single header, ignoring what other headers have claimed.
pub fn classify_header(header: &str) -> ColumnRole {
    let lower = header.to_lowercase();
    ROLE_RULES
        .iter()
        .find(|(_, triggers)| triggers.iter().any(|t| lower.contains(t)))
        .map(|(role, _)| *role)
        .unwrap_or(ColumnRole::Unmapped)
}

/// Role of every header, position for position. Only the first header claiming a role
/// keeps it; later claimants become `Unmapped`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleBindings {
    roles: Vec<ColumnRole>,
}

impl RoleBindings {
    pub fn bind<S: AsRef<str>>(headers: &[S]) -> Self {
        let mut roles: Vec<ColumnRole> = Vec::with_capacity(headers.len());
        for header in headers {
            let candidate = classify_header(header.as_ref());
            let role = if candidate != ColumnRole::Unmapped && roles.contains(&candidate) {
                ColumnRole::Unmapped
            } else {
                candidate
            };
            roles.push(role);
        }
        Self { roles }
    }

    /// Column index bound to `role`, if any header claimed it.
    pub fn column_of(&self, role: ColumnRole) -> Option<usize> {
        if role == ColumnRole::Unmapped {
            return None;
        }
        self.roles.iter().position(|r| *r == role)
    }

    pub fn is_bound(&self, role: ColumnRole) -> bool {
        self.column_of(role).is_some()
    }

    pub fn roles(&self) -> &[ColumnRole] {
        &self.roles
    }
}
