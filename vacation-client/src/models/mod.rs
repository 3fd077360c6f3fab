pub mod user;
pub mod vacation;

pub use user::{AuthResponse, Credentials, NewAccount, UserProfile};
pub use vacation::{Employee, NewVacation, Requester, ReviewDecision, Vacation, VacationStatus};
