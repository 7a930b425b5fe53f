use crate::api::adjustment::{
    AdjustmentDetailResponse, AdjustmentItemRequest, ApplyAdjustmentRequest,
    CreateAdjustmentRequest, DecideAdjustmentRequest,
};
use crate::api::assignment::CreateAssignmentRequest;
use crate::api::ledger::{BalanceQuery, BalanceResponse, CreateLedgerEntryRequest};
use crate::api::punch::{CreatePunchRequest, PunchDayQuery, PunchListResponse, TenantQuery};
use crate::api::summary::{RecalculateSummaryRequest, SummaryQuery};
use crate::model::adjustment::{
    TimeAdjustmentItem, TimeAdjustmentRequest, TimeAdjustmentStatus, TimeAdjustmentType,
};
use crate::model::ledger::{BankHoursLedgerEntry, BankHoursSource};
use crate::model::policy::EnrollmentPolicyAssignment;
use crate::model::punch::{PunchType, TimePunch};
use crate::model::summary::{DailyAttendanceStatus, DailyAttendanceSummary};
use utoipa::OpenApi;
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Punchclock API",
        version = "1.0.0",
        description = r#"
## Attendance Computation & Adjustment Engine

This API records raw time punches, derives per-day attendance summaries,
and keeps a bank-hours ledger that is recomputed idempotently whenever a
day changes.

### 🔹 Key Features
- **Time Punches**
  - Register, list, and delete IN/OUT/BREAK punches with full shift-sequence validation
- **Daily Summaries**
  - Worked/break minutes, expected minutes from the assigned policy, and a derived status
- **Bank Hours**
  - Automatic overtime/deficit ledger entries plus manual credits and debits
- **Adjustment Requests**
  - Propose, approve/reject, and apply corrections to a past day in one validated batch
- **Policy Assignments**
  - Attach per-weekday work policies to enrollments over effective periods

### 📦 Response Format
- JSON-based RESTful responses
- Errors carry a single `message` field

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::punch::create_punch,
        crate::api::punch::delete_punch,
        crate::api::punch::list_punches,

        crate::api::summary::recalculate_summary,
        crate::api::summary::get_summary,

        crate::api::adjustment::create_adjustment,
        crate::api::adjustment::get_adjustment,
        crate::api::adjustment::decide_adjustment,
        crate::api::adjustment::apply_adjustment,

        crate::api::ledger::get_balance,
        crate::api::ledger::create_entry,

        crate::api::assignment::create_assignment
    ),
    components(
        schemas(
            CreatePunchRequest,
            PunchDayQuery,
            TenantQuery,
            PunchListResponse,
            TimePunch,
            PunchType,
            RecalculateSummaryRequest,
            SummaryQuery,
            DailyAttendanceSummary,
            DailyAttendanceStatus,
            AdjustmentItemRequest,
            CreateAdjustmentRequest,
            DecideAdjustmentRequest,
            ApplyAdjustmentRequest,
            AdjustmentDetailResponse,
            TimeAdjustmentRequest,
            TimeAdjustmentItem,
            TimeAdjustmentType,
            TimeAdjustmentStatus,
            BalanceQuery,
            BalanceResponse,
            CreateLedgerEntryRequest,
            BankHoursLedgerEntry,
            BankHoursSource,
            CreateAssignmentRequest,
            EnrollmentPolicyAssignment
        )
    ),
    tags(
        (name = "Punches", description = "Time punch registration APIs"),
        (name = "Summaries", description = "Daily attendance summary APIs"),
        (name = "Adjustments", description = "Time adjustment request APIs"),
        (name = "BankHours", description = "Bank-hours ledger APIs"),
        (name = "Assignments", description = "Policy assignment APIs"),
    )
)]
pub struct ApiDoc;
