//! In-progress fish count for the event being reviewed. Nothing is stored
//! until the operator saves; undo works on the clicks of this visit only.

use crate::errors::{AppError, AppResult};
use crate::models::direction::Direction;
use crate::models::review::{Counts, format_counts};

#[derive(Debug, Clone, Default)]
pub struct Tally {
    counts: Counts,
    /// One entry per add, with the fish of that batch not yet undone.
    actions: Vec<(String, Direction, u32)>,
}

impl Tally {
    /// Start from the counts already saved for the event.
    pub fn from_counts(counts: Counts) -> Self {
        Self {
            counts,
            actions: Vec::new(),
        }
    }

    pub fn add(&mut self, species: &str, direction: Direction) -> AppResult<()> {
        self.add_n(species, direction, 1)
    }

    pub fn add_n(&mut self, species: &str, direction: Direction, n: u32) -> AppResult<()> {
        let species = species.trim();
        if species.is_empty() {
            return Err(AppError::InvalidCount("empty species".into()));
        }
        if !direction.is_set() {
            return Err(AppError::InvalidDirection("unset".into()));
        }
        if n == 0 {
            return Ok(());
        }

        let key = (species.to_string(), direction);
        let current = self.counts.get(&key).copied().unwrap_or(0);
        let total = current
            .checked_add(n)
            .ok_or_else(|| AppError::InvalidCount(format!("{species}: {n} is too many")))?;

        self.counts.insert(key, total);
        self.actions.push((species.to_string(), direction, n));
        Ok(())
    }

    /// Remove one fish of the last batch added; returns its species and direction.
    pub fn undo(&mut self) -> Option<(String, Direction)> {
        let (species, direction, left) = self.actions.last_mut()?;
        let key = (species.clone(), *direction);
        *left -= 1;
        if *left == 0 {
            self.actions.pop();
        }

        if let Some(ct) = self.counts.get_mut(&key) {
            *ct = ct.saturating_sub(1);
            if *ct == 0 {
                self.counts.remove(&key);
            }
        }
        Some(key)
    }

    pub fn clear(&mut self) {
        self.counts.clear();
        self.actions.clear();
    }

    pub fn counts(&self) -> &Counts {
        &self.counts
    }

    pub fn total(&self) -> u64 {
        self.counts.values().map(|&c| u64::from(c)).sum()
    }

    pub fn format(&self) -> String {
        format_counts(&self.counts)
    }
}

/// Parse `SPECIES:DIRECTION[:N]`, e.g. `Coho:up` or `Rainbow:down:3`.
pub fn parse_count_spec(spec: &str) -> AppResult<(String, Direction, u32)> {
    let parts: Vec<&str> = spec.split(':').map(str::trim).collect();
    let (species, dir, n) = match parts.as_slice() {
        [species, dir] => (*species, *dir, 1),
        [species, dir, n] => {
            let n = n
                .parse::<u32>()
                .map_err(|_| AppError::InvalidCount(spec.to_string()))?;
            (*species, *dir, n)
        }
        _ => return Err(AppError::InvalidCount(spec.to_string())),
    };

    if species.is_empty() || n == 0 {
        return Err(AppError::InvalidCount(spec.to_string()));
    }
    let direction = Direction::parse(dir)?;
    if !direction.is_set() {
        return Err(AppError::InvalidCount(spec.to_string()));
    }

    Ok((species.to_string(), direction, n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_undo_clear() {
        let mut t = Tally::default();
        t.add("Chinook", Direction::Up).unwrap();
        t.add("Chinook", Direction::Up).unwrap();
        t.add("Rainbow", Direction::Down).unwrap();
        assert_eq!(t.format(), "2 Chinook UP, 1 Rainbow DOWN");

        assert_eq!(t.undo(), Some(("Rainbow".to_string(), Direction::Down)));
        assert_eq!(t.format(), "2 Chinook UP");
        assert_eq!(t.total(), 2);

        t.clear();
        assert_eq!(t.undo(), None);
        assert_eq!(t.format(), "(none)");
    }

    #[test]
    fn undo_does_not_touch_saved_counts() {
        let mut saved = Counts::new();
        saved.insert(("Coho".into(), Direction::Stay), 1);
        let mut t = Tally::from_counts(saved.clone());
        assert_eq!(t.undo(), None);
        assert_eq!(t.counts(), &saved);
    }

    #[test]
    fn batches_are_undone_one_fish_at_a_time() {
        let mut t = Tally::default();
        t.add_n("Coho", Direction::Up, 3).unwrap();
        t.add("Rainbow", Direction::Down).unwrap();

        assert_eq!(t.undo(), Some(("Rainbow".to_string(), Direction::Down)));
        assert_eq!(t.undo(), Some(("Coho".to_string(), Direction::Up)));
        assert_eq!(t.format(), "2 Coho UP");
    }

    #[test]
    fn huge_batches_are_cheap_and_overflow_is_rejected() {
        let mut t = Tally::default();
        t.add_n("Coho", Direction::Up, 4_000_000_000).unwrap();
        assert_eq!(t.total(), 4_000_000_000);

        assert!(matches!(
            t.add_n("Coho", Direction::Up, 400_000_000),
            Err(AppError::InvalidCount(_))
        ));
        assert_eq!(t.total(), 4_000_000_000);
    }

    #[test]
    fn rejects_unset_direction() {
        let mut t = Tally::default();
        assert!(t.add("Coho", Direction::Unset).is_err());
        assert!(t.add(" ", Direction::Up).is_err());
    }

    #[test]
    fn parses_count_specs() {
        assert_eq!(
            parse_count_spec("Coho:up").unwrap(),
            ("Coho".to_string(), Direction::Up, 1)
        );
        assert_eq!(
            parse_count_spec("Non fish:x:3").unwrap(),
            ("Non fish".to_string(), Direction::Stay, 3)
        );
        assert!(parse_count_spec("Coho").is_err());
        assert!(parse_count_spec("Coho:up:0").is_err());
        assert!(parse_count_spec("Coho:left").is_err());
    }
}
