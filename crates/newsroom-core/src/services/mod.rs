//! Domain services - the publishing rules, wired over the ports.

mod accounts;
mod digest;
mod notification;
mod policy;
mod publishing;
mod rating;

pub use accounts::{AccountService, NewAccount, ProfileChanges};
pub use digest::{DigestService, DigestSummary, JobHistoryService, JOB_HISTORY_RETENTION_DAYS};
pub use notification::{DeliveryFailure, DeliveryReport, NotificationDispatcher};
pub use policy::{PublicationPolicy, DAILY_POST_LIMIT};
pub use publishing::{PostChanges, PostDraft, PublishingService};
pub use rating::{combined_rating, RatingService};
