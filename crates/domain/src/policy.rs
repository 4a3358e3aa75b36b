// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Statutory and business constants that drive deadline calculation.

use crate::vehicle::VehicleRecord;
use serde::{Deserialize, Serialize};

/// The disposition form issued once the redemption period has expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DispositionForm {
    Tr52,
    Tr208,
}

impl DispositionForm {
    /// Returns the form name as printed on the document.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tr52 => "TR52",
            Self::Tr208 => "TR208",
        }
    }
}

/// Where a vehicle goes once its disposition form has matured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReadinessRoute {
    Auction,
    Scrap,
}

/// Day counts and routing rules for the disposition lifecycle.
///
/// All offsets are calendar days. They are unsigned, so no deadline can
/// fall before the date it is counted from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlinePolicy {
    /// Days after the tow date that the owner notice falls due.
    pub owner_notice_days: u32,
    /// Length of the redemption period, counted from the TOP-sent date.
    pub redemption_days: u32,
    /// Days after the tow date used as the redemption start when no TOP-sent
    /// date was recorded.
    pub redemption_fallback_offset_days: u32,
    /// Days after redemption expiry that a disposition form may be issued.
    pub disposition_eligibility_offset_days: u32,
    /// Days after the disposition form is sent that the vehicle is ready for
    /// auction or scrap.
    pub disposition_ready_days: u32,
    /// Jurisdictions (case-insensitive) that take the TR208 form. All others
    /// take TR52.
    pub tr208_jurisdictions: Vec<String>,
    /// Readiness route for vehicles that went through TR52.
    pub tr52_route: ReadinessRoute,
    /// Readiness route for vehicles that went through TR208.
    pub tr208_route: ReadinessRoute,
}

impl Default for DeadlinePolicy {
    fn default() -> Self {
        Self {
            owner_notice_days: 7,
            redemption_days: 20,
            redemption_fallback_offset_days: 1,
            disposition_eligibility_offset_days: 1,
            disposition_ready_days: 15,
            tr208_jurisdictions: Vec::new(),
            tr52_route: ReadinessRoute::Auction,
            tr208_route: ReadinessRoute::Scrap,
        }
    }
}

impl DeadlinePolicy {
    /// Selects the disposition form for a vehicle by its jurisdiction.
    #[must_use]
    pub fn form_for(&self, record: &VehicleRecord) -> DispositionForm {
        let takes_tr208: bool = record.jurisdiction.as_deref().is_some_and(|jurisdiction| {
            self.tr208_jurisdictions
                .iter()
                .any(|candidate| candidate.trim().eq_ignore_ascii_case(jurisdiction.trim()))
        });

        if takes_tr208 {
            DispositionForm::Tr208
        } else {
            DispositionForm::Tr52
        }
    }

    /// Returns the readiness route that follows a disposition form.
    #[must_use]
    pub const fn route_for(&self, form: DispositionForm) -> ReadinessRoute {
        match form {
            DispositionForm::Tr52 => self.tr52_route,
            DispositionForm::Tr208 => self.tr208_route,
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::vehicle::CallNumber;

    fn vehicle_in(jurisdiction: Option<&str>) -> VehicleRecord {
        let mut record: VehicleRecord =
            VehicleRecord::new(CallNumber::new("C-1").expect("valid call number"), None);
        record.jurisdiction = jurisdiction.map(String::from);
        record
    }

    #[test]
    fn test_form_defaults_to_tr52() {
        let policy: DeadlinePolicy = DeadlinePolicy::default();
        assert_eq!(policy.form_for(&vehicle_in(None)), DispositionForm::Tr52);
        assert_eq!(
            policy.form_for(&vehicle_in(Some("Springfield"))),
            DispositionForm::Tr52
        );
    }

    #[test]
    fn test_form_uses_tr208_jurisdiction_list() {
        let policy: DeadlinePolicy = DeadlinePolicy {
            tr208_jurisdictions: vec![String::from("Shelbyville")],
            ..DeadlinePolicy::default()
        };
        assert_eq!(
            policy.form_for(&vehicle_in(Some(" shelbyville"))),
            DispositionForm::Tr208
        );
        assert_eq!(policy.route_for(DispositionForm::Tr208), ReadinessRoute::Scrap);
        assert_eq!(policy.route_for(DispositionForm::Tr52), ReadinessRoute::Auction);
    }
}
