//! Application session: the profile being edited, the plan on screen and
//! which week of it is selected. Transitions consume and return the value.

use crate::adaptive::{view_week, AdaptiveError, WeekView};
use crate::clock::Clock;
use crate::models::{CheckIn, Profile, SavedEntry};
use crate::planner::{generate_plan, Plan};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppSession {
  pub profile: Profile,
  pub plan: Option<Plan>,
  pub active_saved_id: Option<String>,
  pub selected_week: usize,
}

impl AppSession {
  pub fn new(profile: Profile) -> Self {
    Self {
      profile,
      ..Self::default()
    }
  }

  /// Replacing the profile discards any plan built from the old one.
  pub fn with_profile(self, profile: Profile) -> Self {
    Self::new(profile)
  }

  pub fn generate(self, clock: &dyn Clock) -> Self {
    let plan = generate_plan(&self.profile, clock);
    Self {
      plan: Some(plan),
      active_saved_id: None,
      selected_week: 0,
      ..self
    }
  }

  pub fn open_saved(self, entry: SavedEntry) -> Self {
    Self {
      profile: entry.profile,
      plan: Some(entry.plan),
      active_saved_id: Some(entry.saved_id),
      selected_week: 0,
    }
  }

  pub fn mark_saved(self, saved_id: &str) -> Self {
    Self {
      active_saved_id: Some(saved_id.to_string()),
      ..self
    }
  }

  pub fn select_week(self, week_index: usize) -> Result<Self, AdaptiveError> {
    let weeks = self.plan.as_ref().map_or(0, |p| p.weeks.len());
    if week_index >= weeks {
      return Err(AdaptiveError::WeekNotFound(week_index));
    }
    Ok(Self {
      selected_week: week_index,
      ..self
    })
  }

  /// The selected week, regenerated from check-ins when possible
  pub fn current_view<'a>(&'a self, checkins: &[CheckIn]) -> Option<WeekView<'a>> {
    let plan = self.plan.as_ref()?;
    view_week(plan, self.selected_week, checkins)
  }
}
