pub mod picklist;
pub mod weekly;
pub mod window;

pub use picklist::{build_picklists, PicklistMeta, Picklists, TYPE_OPTIONS};
pub use weekly::{aggregate_weekly, week_start, WeeklyAggregate};
pub use window::{same_month_day, DateWindow, YtdWindows};
