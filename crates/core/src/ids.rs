use thiserror::Error;

/// First value handed out by every per-kind counter in a fresh store.
pub const ID_COUNTER_BASE: u32 = 4001;

/// Letter used when a name has no second token.
const MISSING_INITIAL: char = 'X';

/// Raised when a counter cannot advance past its current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("id counter exhausted at {0}")]
    Exhausted(u32),
}

/// Custom identifiers for the three rows that depend on a student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordIds {
    pub placement_id: String,
    pub programming_id: String,
    pub soft_skill_id: String,
}

/// Uppercase initials of the first two name tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameInitials {
    pub first: char,
    pub second: char,
}

impl NameInitials {
    pub fn from_name(name: &str) -> Self {
        let mut tokens = name.split_whitespace().map(initial_of);
        let first = tokens.next().unwrap_or(MISSING_INITIAL);
        let second = tokens.next().unwrap_or(MISSING_INITIAL);
        Self { first, second }
    }
}

fn initial_of(token: &str) -> char {
    token
        .chars()
        .next()
        .and_then(|c| c.to_uppercase().next())
        .unwrap_or(MISSING_INITIAL)
}

/// Monotonic counters, one per identifier kind.
///
/// Every call to [`IdCounters::next_ids`] advances all three counters by one,
/// so the numeric tail alone keeps identifiers of one kind unique within a
/// run even when initials collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdCounters {
    placement: u32,
    programming: u32,
    soft_skill: u32,
}

impl Default for IdCounters {
    fn default() -> Self {
        Self::starting_at(ID_COUNTER_BASE)
    }
}

impl IdCounters {
    pub fn starting_at(base: u32) -> Self {
        Self {
            placement: base,
            programming: base,
            soft_skill: base,
        }
    }

    /// Counter value the next student will receive for its placement id.
    pub fn peek(&self) -> u32 {
        self.placement
    }

    /// Fails with [`IdError::Exhausted`] and leaves the counters untouched once
    /// any counter would pass `u32::MAX`.
    pub fn next_ids(&mut self, name: &str, enrollment_year: i32) -> Result<RecordIds, IdError> {
        let advance = |counter: u32| counter.checked_add(1).ok_or(IdError::Exhausted(counter));
        let next = Self {
            placement: advance(self.placement)?,
            programming: advance(self.programming)?,
            soft_skill: advance(self.soft_skill)?,
        };

        let NameInitials { first, second } = NameInitials::from_name(name);
        let year_suffix = enrollment_year.rem_euclid(100);

        let ids = RecordIds {
            placement_id: format!("{first}{second}{year_suffix:02}{}", self.placement),
            programming_id: format!("{second}{first}{}", self.programming),
            soft_skill_id: format!("{first}{second}{}", self.soft_skill),
        };

        *self = next;
        Ok(ids)
    }
}
