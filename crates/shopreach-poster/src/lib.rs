//! Delivery of a promotional post to every eligible group, with per-group
//! status tracking in the group store.

pub mod action;
pub mod dispatcher;
pub mod group_post;

pub use action::{DeliveryAction, DeliveryStep, StepFailure};
pub use dispatcher::{
    dispatch, BlockedTarget, DispatchError, DispatchOptions, DispatchReport, SentTarget,
};
pub use group_post::{status_url, GroupPostAction, PostContent, PostLocators, PostPacing};
