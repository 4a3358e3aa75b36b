// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use towline_domain::{
    DeadlinePolicy, DispositionForm, NotificationType, ReadinessRoute, Status, VehicleRecord,
};

/// A document the engine asks the document collaborator to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentType {
    /// Temporary ownership permit / impound notice.
    Top,
    Tr52,
    Tr208,
}

impl DocumentType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "TOP",
            Self::Tr52 => "TR52",
            Self::Tr208 => "TR208",
        }
    }
}

impl From<DispositionForm> for DocumentType {
    fn from(form: DispositionForm) -> Self {
        match form {
            DispositionForm::Tr52 => Self::Tr52,
            DispositionForm::Tr208 => Self::Tr208,
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An automatic status advance implied by a due deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedAdvance {
    pub target: Status,
    /// The document that must be generated before the transition is applied.
    pub document: Option<DocumentType>,
}

/// Returns the automatic advance a due deadline implies for a vehicle in its
/// current status, if any.
///
/// - Owner notice due while `New`: generate the TOP and move to `TOP Generated`.
/// - Disposition eligibility due while `TOP Generated`: generate the
///   jurisdiction's form and move to `TR52 Ready` or `TR208 Ready`.
/// - Readiness due while `TR52 Ready`/`TR208 Ready`: move to the policy's
///   readiness route.
///
/// Redemption expiry is notify-only.
#[must_use]
pub fn planned_advance(
    record: &VehicleRecord,
    notification_type: NotificationType,
    policy: &DeadlinePolicy,
) -> Option<PlannedAdvance> {
    match (notification_type, record.status) {
        (NotificationType::OwnerNotice, Status::New) => Some(PlannedAdvance {
            target: Status::TopGenerated,
            document: Some(DocumentType::Top),
        }),
        (NotificationType::DispositionEligibility, Status::TopGenerated) => {
            let form: DispositionForm = policy.form_for(record);
            let target: Status = match form {
                DispositionForm::Tr52 => Status::Tr52Ready,
                DispositionForm::Tr208 => Status::Tr208Ready,
            };
            Some(PlannedAdvance {
                target,
                document: Some(DocumentType::from(form)),
            })
        }
        (NotificationType::DispositionReadiness, Status::Tr52Ready) => {
            Some(readiness_advance(policy.route_for(DispositionForm::Tr52)))
        }
        (NotificationType::DispositionReadiness, Status::Tr208Ready) => {
            Some(readiness_advance(policy.route_for(DispositionForm::Tr208)))
        }
        _ => None,
    }
}

const fn readiness_advance(route: ReadinessRoute) -> PlannedAdvance {
    let target: Status = match route {
        ReadinessRoute::Auction => Status::ReadyForAuction,
        ReadinessRoute::Scrap => Status::ReadyForScrap,
    };
    PlannedAdvance {
        target,
        document: None,
    }
}
