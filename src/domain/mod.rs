//! Core domain types for Growquest

mod category;
mod error;
mod goal;
mod task;
mod user;

pub use category::Category;
pub use error::DomainError;
pub use goal::{Goal, NewGoal};
pub use task::{DailyCompletions, NewTask, Task, TaskCatalog};
pub use user::UserId;
