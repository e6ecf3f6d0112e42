use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::month_slot;
use crate::errors::{PlannerError, Result};

use super::category::{Category, MoveDirection};

pub const MONTHS_PER_YEAR: u32 = 12;

/// Amounts keyed by two-digit month slot (`"01"`..`"12"`).
pub type MonthValues = BTreeMap<String, f64>;

/// All yearly grids keyed by calendar year.
pub type YearlyLedgers = BTreeMap<i32, YearLedger>;

/// One year of the expense grid: ordered categories and their monthly cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearLedger {
    #[serde(default)]
    pub cats: Vec<Category>,
    #[serde(default)]
    pub vals: BTreeMap<Uuid, MonthValues>,
}

/// Returns the grid for `year`, seeding it with `defaults` on first access.
pub fn ensure_year<'a>(
    ledgers: &'a mut YearlyLedgers,
    year: i32,
    defaults: &[String],
) -> &'a mut YearLedger {
    ledgers.entry(year).or_insert_with(|| {
        tracing::info!(year, categories = defaults.len(), "seeding yearly ledger");
        YearLedger::seeded(defaults)
    })
}

impl YearLedger {
    pub fn seeded(names: &[String]) -> Self {
        let mut ledger = Self::default();
        for name in names {
            ledger.push_category(Category::new(name.trim()));
        }
        ledger
    }

    fn push_category(&mut self, category: Category) -> Uuid {
        let id = category.id;
        self.vals.entry(id).or_default();
        self.cats.push(category);
        id
    }

    pub fn category(&self, id: Uuid) -> Option<&Category> {
        self.cats.iter().find(|category| category.id == id)
    }

    fn category_mut(&mut self, id: Uuid) -> Result<&mut Category> {
        self.cats
            .iter_mut()
            .find(|category| category.id == id)
            .ok_or_else(|| PlannerError::not_found("category", id))
    }

    /// Case-insensitive lookup by name.
    pub fn category_by_name(&self, name: &str) -> Option<&Category> {
        self.cats.iter().find(|category| category.matches_name(name))
    }

    pub fn get_or_create_category(&mut self, name: &str) -> Uuid {
        match self.category_by_name(name) {
            Some(category) => category.id,
            None => {
                tracing::debug!(name, "creating category");
                self.push_category(Category::new(name.trim()))
            }
        }
    }

    pub fn add_category(&mut self, name: &str) -> Result<Uuid> {
        let name = self.validate_name(None, name)?;
        Ok(self.push_category(Category::new(name)))
    }

    pub fn rename_category(&mut self, id: Uuid, name: &str) -> Result<()> {
        let name = self.validate_name(Some(id), name)?;
        self.category_mut(id)?.name = name;
        Ok(())
    }

    pub fn set_category_color(&mut self, id: Uuid, color: Option<String>) -> Result<()> {
        let color = color
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        self.category_mut(id)?.color = color;
        Ok(())
    }

    /// Swaps the category with its neighbour. Returns `false` when it is
    /// already at that edge.
    pub fn move_category(&mut self, id: Uuid, direction: MoveDirection) -> Result<bool> {
        let index = self
            .cats
            .iter()
            .position(|category| category.id == id)
            .ok_or_else(|| PlannerError::not_found("category", id))?;
        let target = match direction {
            MoveDirection::Up if index > 0 => index - 1,
            MoveDirection::Down if index + 1 < self.cats.len() => index + 1,
            _ => return Ok(false),
        };
        self.cats.swap(index, target);
        Ok(true)
    }

    /// Removes the category row and its cells.
    pub fn delete_category(&mut self, id: Uuid) -> Result<Category> {
        let index = self
            .cats
            .iter()
            .position(|category| category.id == id)
            .ok_or_else(|| PlannerError::not_found("category", id))?;
        self.vals.remove(&id);
        Ok(self.cats.remove(index))
    }

    pub fn cell(&self, id: Uuid, month: u32) -> f64 {
        self.vals
            .get(&id)
            .and_then(|values| values.get(&month_slot(month)))
            .copied()
            .unwrap_or(0.0)
    }

    /// Hand edit of a cell. The value is rounded to a whole amount; negative
    /// or non-finite input stores zero.
    pub fn set_cell(&mut self, id: Uuid, month: u32, value: f64) -> Result<f64> {
        check_month(month)?;
        if self.category(id).is_none() {
            return Err(PlannerError::not_found("category", id));
        }
        let stored = if value.is_finite() && value >= 0.0 {
            value.round()
        } else {
            0.0
        };
        self.vals
            .entry(id)
            .or_default()
            .insert(month_slot(month), stored);
        Ok(stored)
    }

    /// Moves a cell by `delta`, never below zero. Returns the new value.
    pub fn adjust_cell(&mut self, id: Uuid, month: u32, delta: f64) -> f64 {
        let slot = self.vals.entry(id).or_default().entry(month_slot(month)).or_insert(0.0);
        *slot = (*slot + delta).max(0.0);
        *slot
    }

    pub fn row_total(&self, id: Uuid) -> f64 {
        (1..=MONTHS_PER_YEAR).map(|month| self.cell(id, month)).sum()
    }

    pub fn month_totals(&self) -> [f64; MONTHS_PER_YEAR as usize] {
        let mut totals = [0.0; MONTHS_PER_YEAR as usize];
        for category in &self.cats {
            for (index, total) in totals.iter_mut().enumerate() {
                *total += self.cell(category.id, index as u32 + 1);
            }
        }
        totals
    }

    pub fn grand_total(&self) -> f64 {
        self.month_totals().iter().sum()
    }

    /// Drops cells that belong to no category and clamps negative amounts.
    /// Returns how many orphaned rows were removed.
    pub fn normalize(&mut self) -> usize {
        let known: Vec<Uuid> = self.cats.iter().map(|category| category.id).collect();
        let before = self.vals.len();
        self.vals.retain(|id, _| known.contains(id));
        for id in known {
            let values = self.vals.entry(id).or_default();
            for amount in values.values_mut() {
                if !amount.is_finite() || *amount < 0.0 {
                    *amount = 0.0;
                }
            }
        }
        before.saturating_sub(self.vals.len())
    }

    fn validate_name(&self, current: Option<Uuid>, name: &str) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PlannerError::Validation("category name is required".into()));
        }
        if self
            .cats
            .iter()
            .any(|category| Some(category.id) != current && category.matches_name(name))
        {
            return Err(PlannerError::Validation(format!(
                "category `{name}` already exists"
            )));
        }
        Ok(name.to_string())
    }
}

fn check_month(month: u32) -> Result<()> {
    if (1..=MONTHS_PER_YEAR).contains(&month) {
        Ok(())
    } else {
        Err(PlannerError::Validation(format!(
            "month must be between 1 and 12 (got {month})"
        )))
    }
}
