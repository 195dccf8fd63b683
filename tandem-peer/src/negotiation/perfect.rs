use std::fmt;

/// Which side yields when both peers offer at once. The offer creator is impolite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Polite,
    Impolite,
}

impl Role {
    pub fn is_polite(self) -> bool {
        matches!(self, Self::Polite)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Polite => "polite",
            Self::Impolite => "impolite",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleConflict {
    pub assigned: Role,
    pub requested: Role,
}

impl fmt::Display for RoleConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "role already assigned as {}, cannot become {}",
            self.assigned, self.requested
        )
    }
}

/// What to do with a remote offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferDecision {
    Apply,
    RollbackThenApply,
    Ignore,
}

/// The perfect-negotiation flags, and nothing else. Pure, so the collision
/// rule can be exercised without a connection.
#[derive(Debug, Clone, Default)]
pub struct PerfectNegotiation {
    role: Option<Role>,
    making_offer: bool,
    ignore_offer: bool,
}

impl PerfectNegotiation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// A role is fixed for the life of the session. Re-asserting the same role is fine.
    pub fn assign_role(&mut self, role: Role) -> Result<(), RoleConflict> {
        match self.role {
            Some(assigned) if assigned != role => Err(RoleConflict {
                assigned,
                requested: role,
            }),
            _ => {
                self.role = Some(role);
                Ok(())
            }
        }
    }

    pub fn begin_offer(&mut self) {
        self.making_offer = true;
    }

    pub fn end_offer(&mut self) {
        self.making_offer = false;
    }

    pub fn making_offer(&self) -> bool {
        self.making_offer
    }

    pub fn ignoring_offer(&self) -> bool {
        self.ignore_offer
    }

    pub fn on_remote_offer(&mut self, signaling_stable: bool) -> OfferDecision {
        let collision = self.making_offer || !signaling_stable;
        let polite = self.role.is_some_and(Role::is_polite);

        self.ignore_offer = collision && !polite;
        if self.ignore_offer {
            OfferDecision::Ignore
        } else if collision {
            OfferDecision::RollbackThenApply
        } else {
            OfferDecision::Apply
        }
    }

    pub fn on_remote_answer(&mut self) {
        self.ignore_offer = false;
    }

    /// Candidates that belong to an ignored offer are expected to fail.
    pub fn accepts_candidates(&self) -> bool {
        !self.ignore_offer
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
