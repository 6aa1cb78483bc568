//! The month grid

use std::fmt::{Display, Formatter};

use crate::date::{to_local_date_key, YearMonth};
use crate::day::{render_day, DayList};
use crate::store::TaskStore;

/// One day of the month grid
#[derive(Clone, Debug, PartialEq)]
pub struct DayCell {
    /// Day of the month, starting at 1
    pub day: u32,
    pub date_key: String,
    pub is_today: bool,
    pub tasks: DayList,
}

/// A rendered month
#[derive(Clone, Debug, PartialEq)]
pub struct MonthGrid {
    pub month: YearMonth,
    /// e.g. `October 2026`
    pub label: String,
    pub cells: Vec<DayCell>,
}

impl MonthGrid {
    pub fn cell(&self, date_key: &str) -> Option<&DayCell> {
        self.cells.iter().find(|cell| cell.date_key == date_key)
    }
}

/// Lay out every day of `month`, each with its own task list.
///
/// `focus` is the date key whose trailing input has the keyboard focus, if any.
pub fn render_month(month: YearMonth, today_key: &str, store: &TaskStore, focus: Option<&str>) -> MonthGrid {
    let cells = month.days()
        .map(|date| {
            let date_key = to_local_date_key(&date);
            let focused = focus == Some(date_key.as_str());
            let tasks = render_day(&date_key, store.day(&date_key), focused);
            DayCell {
                day: chrono::Datelike::day(&date),
                is_today: date_key == today_key,
                date_key,
                tasks,
            }
        })
        .collect();

    MonthGrid { month, label: month.label(), cells }
}

impl Display for MonthGrid {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        writeln!(f, "  < {} >", self.label)?;
        for cell in &self.cells {
            let today = if cell.is_today { " (today)" } else { "" };
            writeln!(f, "{:>2}{}", cell.day, today)?;
            write!(f, "{}", cell.tasks)?;
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use crate::task::{Task, TaskKind};

    #[test]
    fn one_cell_per_day() {
        let mut store = TaskStore::new();
        let mut tasks = HashMap::new();
        tasks.insert("2024-02-29".to_string(), vec![
            Task::new(1, "2024-02-29".to_string(), TaskKind::Item{ text: "leap".to_string(), completed: false, group: None }),
        ]);
        tasks.insert("2024-03-01".to_string(), vec![
            Task::new(2, "2024-03-01".to_string(), TaskKind::Item{ text: "march".to_string(), completed: false, group: None }),
        ]);
        let ticket = store.begin_fetch();
        store.apply(ticket, tasks);

        let feb = YearMonth::new(2024, 2).unwrap();
        let grid = render_month(feb, "2024-02-10", &store, Some("2024-02-29"));

        assert_eq!(grid.label, "February 2024");
        assert_eq!(grid.cells.len(), 29);
        assert_eq!(grid.cells[0].date_key, "2024-02-01");
        assert_eq!(grid.cells[0].day, 1);

        let todays: Vec<&str> = grid.cells.iter().filter(|c| c.is_today).map(|c| c.date_key.as_str()).collect();
        assert_eq!(todays, vec!["2024-02-10"]);

        let leap = grid.cell("2024-02-29").unwrap();
        assert_eq!(leap.tasks.rows.len(), 1);
        assert!(leap.tasks.input.focused);
        assert!(grid.cell("2024-02-28").unwrap().tasks.input.focused == false);
        assert!(grid.cell("2024-03-01").is_none());
    }
}
