//! # API Request/Response Types
//!
//! JSON structures for the HTTP API. Responses also derive `Deserialize` so
//! integration tests can decode them.

use convalida_core::{
    Course, CourseCode, DataIssue, PartialCredit, PlanSide, ProgressReport, Resolution, Session,
    TermGroup,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

// =============================================================================
// RESOLUTION RESPONSE
// =============================================================================

/// Current resolution plus the dashboard KPIs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionResponse {
    pub satisfied: Vec<CourseCode>,
    pub partials: Vec<PartialCredit>,
    pub unsatisfied: Vec<CourseCode>,
    pub earned_credits: u32,
    pub total_credits: u32,
    pub recognized_count: usize,
    pub pending_count: usize,
}

impl ResolutionResponse {
    pub fn new(resolution: &Resolution, total_credits: u32) -> Self {
        Self {
            satisfied: resolution.satisfied.iter().cloned().collect(),
            partials: resolution.partials.clone(),
            unsatisfied: resolution.unsatisfied.clone(),
            earned_credits: resolution.earned_credits,
            total_credits,
            recognized_count: resolution.recognized_count(),
            pending_count: resolution.pending_count(),
        }
    }
}

// =============================================================================
// PROGRESS RESPONSE
// =============================================================================

/// One category row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryJson {
    pub category: String,
    pub earned: u32,
    pub total: u32,
    pub percent: u8,
}

/// Per-category progress plus the overall row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressResponse {
    pub categories: Vec<CategoryJson>,
    pub earned: u32,
    pub total: u32,
    pub percent: u8,
}

impl From<&ProgressReport> for ProgressResponse {
    fn from(report: &ProgressReport) -> Self {
        Self {
            categories: report
                .categories
                .iter()
                .map(|c| CategoryJson {
                    category: c.category.to_string(),
                    earned: c.earned,
                    total: c.total,
                    percent: c.percent(),
                })
                .collect(),
            earned: report.earned(),
            total: report.total(),
            percent: report.percent(),
        }
    }
}

// =============================================================================
// PLAN RESPONSE
// =============================================================================

/// A course with its display mark.
///
/// `marked` is the completion mark on the origin side and the recognition
/// mark on the destination side. `coverage` carries the highest partial
/// coverage recorded for an unrecognized destination course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanCourse {
    #[serde(flatten)]
    pub course: Course,
    pub marked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<u8>,
}

/// One term group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermJson {
    pub term: u32,
    pub label: String,
    pub credits: u32,
    pub courses: Vec<PlanCourse>,
}

/// A curriculum laid out by term.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResponse {
    pub side: PlanSide,
    pub id: String,
    pub name: String,
    pub terms: Vec<TermJson>,
}

impl PlanResponse {
    pub fn new(session: &Session, side: PlanSide, groups: &[TermGroup<'_>]) -> Self {
        let curriculum = session.store().curriculum(side);
        let resolution = session.resolution();

        let plan_course = |course: &Course| match side {
            PlanSide::Origin => PlanCourse {
                course: course.clone(),
                marked: session.is_completed(&course.code),
                coverage: None,
            },
            PlanSide::Destination => {
                let marked = resolution.is_satisfied(&course.code);
                let coverage = if marked {
                    None
                } else {
                    resolution
                        .partials_for(&course.code)
                        .map(|p| p.coverage)
                        .max()
                };
                PlanCourse {
                    course: course.clone(),
                    marked,
                    coverage,
                }
            }
        };

        Self {
            side,
            id: curriculum.id.clone(),
            name: curriculum.name.clone(),
            terms: groups
                .iter()
                .map(|group| TermJson {
                    term: group.term.value(),
                    label: group.term.to_string(),
                    credits: group.credits(),
                    courses: group.courses.iter().map(|c| plan_course(c)).collect(),
                })
                .collect(),
        }
    }
}

// =============================================================================
// MUTATION REQUESTS/RESPONSES
// =============================================================================

/// Toggle request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleRequest {
    pub code: String,
}

/// Toggle response: the new completion state and refreshed KPIs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub code: CourseCode,
    pub completed: bool,
    pub recognized_count: usize,
    pub earned_credits: u32,
}

/// Response for reset and wholesale replacements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationResponse {
    pub success: bool,
    pub completed: usize,
    pub recognized_count: usize,
    pub earned_credits: u32,
}

impl MutationResponse {
    pub fn from_session(session: &Session) -> Self {
        let resolution = session.resolution();
        Self {
            success: true,
            completed: session.completed().len(),
            recognized_count: resolution.recognized_count(),
            earned_credits: resolution.earned_credits,
        }
    }
}

/// Import response: sizes of the state after the import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResponse {
    pub success: bool,
    pub origin_courses: usize,
    pub destination_courses: usize,
    pub rules: usize,
    pub completed: usize,
}

impl ImportResponse {
    pub fn from_session(session: &Session) -> Self {
        let store = session.store();
        Self {
            success: true,
            origin_courses: store.origin().len(),
            destination_courses: store.destination().len(),
            rules: store.rules().len(),
            completed: session.completed().len(),
        }
    }
}

// =============================================================================
// AUDIT RESPONSE
// =============================================================================

/// One audit finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub kind: String,
    pub message: String,
}

impl From<&DataIssue> for AuditEntry {
    fn from(issue: &DataIssue) -> Self {
        Self {
            kind: issue.kind().to_string(),
            message: issue.to_string(),
        }
    }
}

/// Audit findings in report order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResponse {
    pub issues: Vec<AuditEntry>,
}
