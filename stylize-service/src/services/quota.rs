use crate::models::{JobKind, SubscriptionType, UserAccount};
use service_core::error::AppError;

const QUOTA_EXCEEDED: &str = "Quota exceeded";

/// Reject the job when the user's metered subscription has no quota left.
///
/// Video jobs are only gated for FREE users.
pub fn check_quota(user: &UserAccount, kind: JobKind) -> Result<(), AppError> {
    if !user.quota_exhausted() {
        return Ok(());
    }

    let message = match (user.subscription_type.as_ref(), kind) {
        (Some(SubscriptionType::Free), JobKind::Image) => {
            "You have reached your weekly limit. Upgrade or watch an ad!"
        }
        (Some(SubscriptionType::Free), JobKind::Video) => "You have reached your weekly limit.",
        (Some(SubscriptionType::Standard), JobKind::Image) => {
            "You have reached your weekly limit of 50 transformations."
        }
        _ => return Ok(()),
    };

    Err(AppError::Forbidden {
        error: QUOTA_EXCEEDED.to_string(),
        message: message.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(subscription: SubscriptionType, quota: Option<i64>) -> UserAccount {
        UserAccount::new("user-1", subscription, quota)
    }

    fn rejection_message(result: Result<(), AppError>) -> String {
        match result {
            Err(AppError::Forbidden { error, message }) => {
                assert_eq!(error, "Quota exceeded");
                message
            }
            other => panic!("expected quota rejection, got {other:?}"),
        }
    }

    #[test]
    fn free_user_with_quota_passes() {
        assert!(check_quota(&user(SubscriptionType::Free, Some(1)), JobKind::Image).is_ok());
    }

    #[test]
    fn free_user_out_of_quota_is_rejected() {
        let message =
            rejection_message(check_quota(&user(SubscriptionType::Free, Some(0)), JobKind::Image));
        assert_eq!(message, "You have reached your weekly limit. Upgrade or watch an ad!");

        let message =
            rejection_message(check_quota(&user(SubscriptionType::Free, Some(-2)), JobKind::Video));
        assert_eq!(message, "You have reached your weekly limit.");
    }

    #[test]
    fn standard_user_out_of_quota_is_rejected_for_images() {
        let message = rejection_message(check_quota(
            &user(SubscriptionType::Standard, Some(0)),
            JobKind::Image,
        ));
        assert_eq!(message, "You have reached your weekly limit of 50 transformations.");
    }

    #[test]
    fn standard_user_videos_are_not_gated() {
        assert!(check_quota(&user(SubscriptionType::Standard, Some(0)), JobKind::Video).is_ok());
    }

    #[test]
    fn other_subscriptions_are_unmetered() {
        let premium = user(SubscriptionType::Other("PREMIUM".to_string()), Some(0));
        assert!(check_quota(&premium, JobKind::Image).is_ok());
        assert!(check_quota(&premium, JobKind::Video).is_ok());
    }

    #[test]
    fn unknown_quota_is_not_gated() {
        assert!(check_quota(&user(SubscriptionType::Free, None), JobKind::Image).is_ok());
    }
}
