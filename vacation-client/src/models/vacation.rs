use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a vacation request, as the backend spells it.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum VacationStatus {
    #[serde(rename = "pendente")]
    Pending,
    #[serde(rename = "aprovado")]
    Approved,
    #[serde(rename = "rejeitado")]
    Rejected,
}

impl fmt::Display for VacationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VacationStatus::Pending => "pending",
            VacationStatus::Approved => "approved",
            VacationStatus::Rejected => "rejected",
        };
        f.write_str(label)
    }
}

/// Outcome an administrator may assign. Pending is not a valid decision.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    #[serde(rename = "aprovado")]
    Approve,
    #[serde(rename = "rejeitado")]
    Reject,
}

impl From<ReviewDecision> for VacationStatus {
    fn from(decision: ReviewDecision) -> Self {
        match decision {
            ReviewDecision::Approve => VacationStatus::Approved,
            ReviewDecision::Reject => VacationStatus::Rejected,
        }
    }
}

/// Requester as embedded in a vacation request.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Employee {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(rename = "nome", default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "cargo", default)]
    pub role: String,
}

/// `funcionario` is a populated profile on admin listings and a bare id
/// elsewhere.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Requester {
    Id(String),
    Profile(Employee),
}

impl Requester {
    pub fn id(&self) -> &str {
        match self {
            Requester::Id(id) => id,
            Requester::Profile(employee) => &employee.id,
        }
    }

    /// Name when populated, id otherwise.
    pub fn label(&self) -> &str {
        match self {
            Requester::Profile(employee) if !employee.name.is_empty() => &employee.name,
            _ => self.id(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Vacation {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(rename = "funcionario", default)]
    pub requester: Option<Requester>,
    #[serde(rename = "dataInicio")]
    pub start_date: DateTime<Utc>,
    #[serde(rename = "dataFim")]
    pub end_date: DateTime<Utc>,
    pub status: VacationStatus,
    #[serde(rename = "motivo", default)]
    pub reason: String,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Vacation {
    /// Only pending requests may be withdrawn by their owner.
    pub fn is_pending(&self) -> bool {
        self.status == VacationStatus::Pending
    }
}

/// Payload for `POST /api/ferias`.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct NewVacation {
    #[serde(rename = "dataInicio")]
    pub start_date: NaiveDate,
    #[serde(rename = "dataFim")]
    pub end_date: NaiveDate,
    #[serde(rename = "motivo")]
    pub reason: String,
}
