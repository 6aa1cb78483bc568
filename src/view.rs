//! Which view is shown, and what it is focused on

use chrono::NaiveDate;

use crate::date::YearMonth;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewMode {
    /// Every day of the focused month
    Calendar,
    /// The task list of the focused day only
    Day,
}

/// Tells the caller what a transition requires
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Refresh {
    /// Re-render from the tasks already in the store
    Render,
    /// The visible date range changed: fetch the tasks again, then render
    Refetch,
}

/// View state. It only changes through the navigation methods below and is never persisted
#[derive(Clone, Debug, PartialEq)]
pub struct ViewState {
    mode: ViewMode,
    focused_month: YearMonth,
    focused_day: NaiveDate,
}

impl ViewState {
    /// The calendar view, focused on `today` and its month
    pub fn starting_at(today: NaiveDate) -> Self {
        Self {
            mode: ViewMode::Calendar,
            focused_month: YearMonth::of(&today),
            focused_day: today,
        }
    }

    pub fn mode(&self) -> ViewMode              { self.mode }
    pub fn focused_month(&self) -> YearMonth    { self.focused_month }
    pub fn focused_day(&self) -> NaiveDate      { self.focused_day }

    pub fn switch_to_calendar(&mut self) -> Refresh {
        self.mode = ViewMode::Calendar;
        Refresh::Render
    }

    pub fn switch_to_day(&mut self) -> Refresh {
        self.mode = ViewMode::Day;
        Refresh::Render
    }

    pub fn next_month(&mut self) -> Refresh {
        self.focused_month = self.focused_month.next();
        Refresh::Refetch
    }

    pub fn prev_month(&mut self) -> Refresh {
        self.focused_month = self.focused_month.prev();
        Refresh::Refetch
    }

    /// Move the day view to another day
    pub fn focus_day(&mut self, day: NaiveDate) -> Refresh {
        self.focused_day = day;
        Refresh::Render
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn switching_views_needs_no_fetch() {
        let mut view = ViewState::starting_at(day(2026, 10, 16));
        assert_eq!(view.mode(), ViewMode::Calendar);
        assert_eq!(view.switch_to_day(), Refresh::Render);
        assert_eq!(view.mode(), ViewMode::Day);
        assert_eq!(view.switch_to_calendar(), Refresh::Render);
        assert_eq!(view.mode(), ViewMode::Calendar);
        assert_eq!(view.focus_day(day(2026, 10, 20)), Refresh::Render);
        assert_eq!(view.focused_day(), day(2026, 10, 20));
    }

    #[test]
    fn month_navigation_refetches() {
        let mut view = ViewState::starting_at(day(2026, 12, 31));
        assert_eq!(view.next_month(), Refresh::Refetch);
        assert_eq!(view.focused_month(), YearMonth::new(2027, 1).unwrap());
        assert_eq!(view.prev_month(), Refresh::Refetch);
        assert_eq!(view.prev_month(), Refresh::Refetch);
        assert_eq!(view.focused_month(), YearMonth::new(2026, 11).unwrap());
        // the day view keeps its own focus
        assert_eq!(view.focused_day(), day(2026, 12, 31));

        for _ in 0..12 {
            view.next_month();
        }
        assert_eq!(view.focused_month(), YearMonth::new(2027, 11).unwrap());
    }
}
