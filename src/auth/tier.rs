use serde::{Deserialize, Serialize};

/// Coarse capability tier. Ordering matters: each tier includes everything
/// below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Member,
    PracticeAdmin,
    SuperAdmin,
}

impl Tier {
    /// Normalize a stored role string into a tier.
    ///
    /// The role column has accumulated spelling variants over the product's
    /// life ("superadmin" next to "super_admin", etc.), so classification is
    /// a single exhaustive table rather than per-route string comparisons.
    /// Anything unrecognized, empty or missing is `Member` - unknown roles
    /// never gain privilege.
    pub fn classify(role: Option<&str>) -> Tier {
        let role = match role {
            Some(r) => r.trim().to_ascii_lowercase(),
            None => return Tier::Member,
        };

        match role.as_str() {
            "super_admin" | "superadmin" | "super-admin" => Tier::SuperAdmin,
            "practice_admin" | "practiceadmin" | "practice-admin" | "admin" | "owner" => {
                Tier::PracticeAdmin
            }
            _ => Tier::Member,
        }
    }

    pub fn is_super_admin(self) -> bool {
        self == Tier::SuperAdmin
    }

    pub fn at_least(self, required: Tier) -> bool {
        self >= required
    }
}
