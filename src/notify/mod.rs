// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storykeep-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storykeep and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Change notification: per-node subscriptions and small observable cells.

pub mod atom;
pub mod bus;
pub mod subscription;

pub use atom::Atom;
pub use bus::{Notification, NotificationBus, NotifyCause, SubscribeMode};
pub use subscription::Subscription;
