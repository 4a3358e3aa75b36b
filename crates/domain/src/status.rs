// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Vehicle disposition status.
//!
//! The status set is closed. Labels are the persisted representation and
//! are only produced or consumed here; every other component works with
//! the enum. The transition graph itself lives in the core crate.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Disposition status of an impounded vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Status {
    /// Vehicle towed and entered; no documents issued yet.
    New,
    /// Temporary ownership permit issued; redemption clock running.
    TopGenerated,
    /// TR52 disposition form issued.
    Tr52Ready,
    /// TR208 disposition form issued.
    Tr208Ready,
    /// Cleared for auction.
    ReadyForAuction,
    /// Cleared for scrap.
    ReadyForScrap,
    /// Returned to the owner or an authorized party.
    Released,
    /// Sold at auction.
    Auctioned,
    /// Scrapped.
    Scrapped,
    /// Transferred to another lot or agency.
    Transferred,
}

impl Status {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 10] = [
        Self::New,
        Self::TopGenerated,
        Self::Tr52Ready,
        Self::Tr208Ready,
        Self::ReadyForAuction,
        Self::ReadyForScrap,
        Self::Released,
        Self::Auctioned,
        Self::Scrapped,
        Self::Transferred,
    ];

    /// Statuses that still require workflow attention.
    pub const ACTIVE: [Self; 6] = [
        Self::New,
        Self::TopGenerated,
        Self::Tr52Ready,
        Self::Tr208Ready,
        Self::ReadyForAuction,
        Self::ReadyForScrap,
    ];

    /// The completed set. A record is archived exactly when its status is here.
    pub const TERMINAL: [Self; 4] = [
        Self::Released,
        Self::Auctioned,
        Self::Scrapped,
        Self::Transferred,
    ];

    /// Returns the persisted label for this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::TopGenerated => "TOP Generated",
            Self::Tr52Ready => "TR52 Ready",
            Self::Tr208Ready => "TR208 Ready",
            Self::ReadyForAuction => "Ready for Auction",
            Self::ReadyForScrap => "Ready for Scrap",
            Self::Released => "Released",
            Self::Auctioned => "Auctioned",
            Self::Scrapped => "Scrapped",
            Self::Transferred => "Transferred",
        }
    }

    /// Returns true if this status belongs to the completed set.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Released | Self::Auctioned | Self::Scrapped | Self::Transferred
        )
    }

    /// Returns true if this status still requires workflow attention.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// The archived flag value this status requires.
    #[must_use]
    pub const fn archived_flag(&self) -> bool {
        self.is_terminal()
    }

    /// Parses a label leniently, ignoring case, surrounding whitespace, and
    /// `_`/`-` separators.
    ///
    /// Used at ingestion boundaries where labels arrive from scraped or
    /// hand-entered data.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatus` if no status matches.
    pub fn parse_lenient(raw: &str) -> Result<Self, DomainError> {
        let wanted: String = squash(raw);
        Self::ALL
            .into_iter()
            .find(|status| squash(status.as_str()) == wanted)
            .ok_or_else(|| DomainError::InvalidStatus {
                status: raw.to_string(),
            })
    }
}

fn squash(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for Status {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::InvalidStatus {
                status: s.to_string(),
            })
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
