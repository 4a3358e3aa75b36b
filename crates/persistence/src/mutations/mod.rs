// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! Every vehicle write is conditioned on the status the caller last read.
//! A write that matches zero rows is reported as a conflict (or as not
//! found, when the vehicle does not exist) and never retried here.

pub mod ledger;
pub mod repair;
pub mod vehicles;
